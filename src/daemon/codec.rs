// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 the dv-router authors

//! Wire codec for the distance-vector protocol.
//!
//! Two ASCII message shapes, `:`-separated, one logical message per
//! UDP datagram:
//!
//! ```text
//! <senderIP>:HELLO:<seq>
//! <senderIP>:DV:(<dest1>,<dist1>):(<dest2>,<dist2>):...:
//! ```
//!
//! Pure and stateless: no I/O, no shared state. Sender/dest IPs are
//! opaque ASCII tokens here, validated only by length.

/// Maximum length of an IP token, in bytes.
const MAX_IP_LEN: usize = 31;

/// A decoded wire message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Hello { sender: String, seq: u16 },
    Dv { sender: String, pairs: Vec<(String, u32)> },
}

impl Message {
    /// Parse a raw datagram payload. Returns `None` for anything that
    /// does not even have a valid sender/kind preamble. Individual
    /// malformed `(dest,dist)` tuples inside an otherwise valid DV are
    /// skipped rather than failing the whole message.
    pub fn parse(raw: &str) -> Option<Message> {
        let mut tokens = raw.split(':');
        let sender = tokens.next()?;
        if sender.is_empty() || sender.len() > MAX_IP_LEN {
            return None;
        }
        let kind = tokens.next()?;

        match kind {
            "HELLO" => {
                let seq: u16 = tokens.next()?.parse().ok()?;
                Some(Message::Hello {
                    sender: sender.to_string(),
                    seq,
                })
            }
            "DV" => {
                let pairs = tokens.filter_map(parse_tuple).collect();
                Some(Message::Dv {
                    sender: sender.to_string(),
                    pairs,
                })
            }
            _ => None,
        }
    }

    /// Encode a HELLO beacon.
    pub fn encode_hello(sender: &str, seq: u16) -> String {
        format!("{sender}:HELLO:{seq}")
    }

    /// Encode a distance vector. `pairs` must already be deduplicated
    /// by destination; each is emitted once, in the given order.
    pub fn encode_dv<'a>(sender: &str, pairs: impl Iterator<Item = (&'a str, u32)>) -> String {
        let mut out = format!("{sender}:DV:");
        for (dest, dist) in pairs {
            out.push('(');
            out.push_str(dest);
            out.push(',');
            out.push_str(&dist.to_string());
            out.push_str("):");
        }
        out
    }
}

/// Parse a single `(ip,int)` token. Tolerates the empty token left by a
/// trailing `:` after the last tuple.
fn parse_tuple(token: &str) -> Option<(String, u32)> {
    if token.is_empty() {
        return None;
    }
    let inner = token.strip_prefix('(')?.strip_suffix(')')?;
    let (ip, dist) = inner.split_once(',')?;
    if ip.is_empty() || ip.len() > MAX_IP_LEN {
        return None;
    }
    let dist: u32 = dist.parse().ok()?;
    Some((ip.to_string(), dist))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_hello() {
        let msg = Message::parse("10.0.0.2:HELLO:7").unwrap();
        assert_eq!(
            msg,
            Message::Hello {
                sender: "10.0.0.2".into(),
                seq: 7
            }
        );
    }

    #[test]
    fn test_parses_dv_with_trailing_colon() {
        let msg = Message::parse("10.0.0.2:DV:(10.0.0.3,0):(10.0.0.4,2):").unwrap();
        assert_eq!(
            msg,
            Message::Dv {
                sender: "10.0.0.2".into(),
                pairs: vec![("10.0.0.3".into(), 0), ("10.0.0.4".into(), 2)],
            }
        );
    }

    #[test]
    fn test_parses_dv_without_trailing_colon() {
        let msg = Message::parse("10.0.0.2:DV:(10.0.0.3,0):(10.0.0.4,2)").unwrap();
        assert_eq!(
            msg,
            Message::Dv {
                sender: "10.0.0.2".into(),
                pairs: vec![("10.0.0.3".into(), 0), ("10.0.0.4".into(), 2)],
            }
        );
    }

    #[test]
    fn test_empty_dv_is_valid() {
        let msg = Message::parse("10.0.0.2:DV:").unwrap();
        assert_eq!(
            msg,
            Message::Dv {
                sender: "10.0.0.2".into(),
                pairs: vec![],
            }
        );
    }

    #[test]
    fn test_skips_malformed_tuples_but_keeps_valid_ones() {
        let msg = Message::parse("10.0.0.2:DV:(bad):(10.0.0.3,0):(10.0.0.4,notanumber):").unwrap();
        assert_eq!(
            msg,
            Message::Dv {
                sender: "10.0.0.2".into(),
                pairs: vec![("10.0.0.3".into(), 0)],
            }
        );
    }

    #[test]
    fn test_rejects_too_few_tokens() {
        assert!(Message::parse("10.0.0.2").is_none());
        assert!(Message::parse("").is_none());
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Message::parse("10.0.0.2:BOGUS:1").is_none());
    }

    #[test]
    fn test_rejects_hello_without_seq() {
        assert!(Message::parse("10.0.0.2:HELLO").is_none());
        assert!(Message::parse("10.0.0.2:HELLO:notanumber").is_none());
    }

    #[test]
    fn test_encodes_hello() {
        assert_eq!(Message::encode_hello("10.0.0.1", 3), "10.0.0.1:HELLO:3");
    }

    #[test]
    fn test_encodes_dv() {
        let pairs = vec![("10.0.0.3", 2u32), ("10.0.0.4", 5u32)];
        let encoded = Message::encode_dv("10.0.0.1", pairs.into_iter());
        assert_eq!(encoded, "10.0.0.1:DV:(10.0.0.3,2):(10.0.0.4,5):");
    }

    #[test]
    fn test_round_trips_through_parse() {
        let encoded = Message::encode_dv(
            "10.0.0.1",
            vec![("10.0.0.3", 2u32), ("10.0.0.4", 5u32)].into_iter(),
        );
        let parsed = Message::parse(&encoded).unwrap();
        assert_eq!(
            parsed,
            Message::Dv {
                sender: "10.0.0.1".into(),
                pairs: vec![("10.0.0.3".into(), 2), ("10.0.0.4".into(), 5)],
            }
        );
    }
}
