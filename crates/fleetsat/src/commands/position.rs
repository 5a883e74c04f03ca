//! Stdin-backed position source.
//!
//! Each line is one fix: `lat,lng[,speed]`. Malformed lines are skipped
//! with a warning; EOF ends the watch.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::warn;

use fleetsat_core::{PositionError, PositionFix, PositionSource, WatchOptions};

pub struct StdinPositionSource;

impl PositionSource for StdinPositionSource {
    fn watch(&self, _options: WatchOptions) -> mpsc::Receiver<Result<PositionFix, PositionError>> {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => match parse_fix(&line) {
                        Some(fix) => {
                            if tx.send(Ok(fix)).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            if !line.trim().is_empty() {
                                warn!(line = %line.trim(), "skipping malformed fix line");
                            }
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx
                            .send(Err(PositionError::Unavailable {
                                message: e.to_string(),
                            }))
                            .await;
                        break;
                    }
                }
            }
        });
        rx
    }
}

/// Parse one `lat,lng[,speed]` line.
fn parse_fix(line: &str) -> Option<PositionFix> {
    let mut parts = line.trim().split(',');
    let lat: f64 = parts.next()?.trim().parse().ok()?;
    let lng: f64 = parts.next()?.trim().parse().ok()?;
    let speed = match parts.next() {
        Some(raw) => Some(raw.trim().parse().ok()?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(PositionFix { lat, lng, speed })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::parse_fix;

    #[test]
    fn parses_lat_lng() {
        let fix = parse_fix("9.93, -84.08").unwrap();
        assert_eq!(fix.lat, 9.93);
        assert_eq!(fix.lng, -84.08);
        assert_eq!(fix.speed, None);
    }

    #[test]
    fn parses_optional_speed() {
        let fix = parse_fix("9.93,-84.08,12.5").unwrap();
        assert_eq!(fix.speed, Some(12.5));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_fix("not-a-fix").is_none());
        assert!(parse_fix("1.0").is_none());
        assert!(parse_fix("1.0,2.0,3.0,4.0").is_none());
        assert!(parse_fix("1.0,north").is_none());
    }
}
