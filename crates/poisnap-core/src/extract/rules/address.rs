//! Address extraction, including split-line reassembly.

use std::collections::HashSet;

use super::patterns::{
    ADDRESS_LABELED, ADDRESS_POSTAL, BLOCK_NUMBER, CONTINUATION_START, FLOOR_MARKER,
    PREFECTURE_START,
};
use super::{FieldPass, LineMatch};

/// Address pass.
///
/// Labeled lines win over postal-prefixed lines, which win over lines
/// opening with a prefecture name. OCR regularly splits one street
/// address across two lines, so a matching line absorbs the next
/// unused line when it looks like a block-number or floor
/// continuation.
pub struct AddressPass;

impl FieldPass for AddressPass {
    fn field(&self) -> &'static str {
        "address"
    }

    fn scan(&self, lines: &[String], used: &HashSet<usize>) -> Option<LineMatch> {
        let tiers: [fn(&str) -> Option<String>; 3] =
            [labeled_address, postal_address, prefecture_address];

        for tier in tiers {
            for (idx, line) in lines.iter().enumerate() {
                if used.contains(&idx) {
                    continue;
                }
                if let Some(value) = tier(line) {
                    return Some(absorb_continuation(value, idx, lines, used));
                }
            }
        }
        None
    }
}

fn labeled_address(line: &str) -> Option<String> {
    ADDRESS_LABELED
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
}

fn postal_address(line: &str) -> Option<String> {
    ADDRESS_POSTAL.is_match(line).then(|| line.to_string())
}

fn prefecture_address(line: &str) -> Option<String> {
    PREFECTURE_START.is_match(line).then(|| line.to_string())
}

/// Whether a line looks like the tail half of a split address.
pub fn is_continuation(line: &str) -> bool {
    CONTINUATION_START.is_match(line)
        || BLOCK_NUMBER.is_match(line)
        || FLOOR_MARKER.is_match(line)
}

fn absorb_continuation(
    value: String,
    idx: usize,
    lines: &[String],
    used: &HashSet<usize>,
) -> LineMatch {
    let next = idx + 1;
    if next < lines.len() && !used.contains(&next) && is_continuation(&lines[next]) {
        let mut joined = value;
        joined.push_str(&lines[next]);
        return LineMatch {
            value: joined,
            lines: vec![idx, next],
        };
    }
    LineMatch::single(value, idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(lines: &[&str]) -> Option<LineMatch> {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        AddressPass.scan(&lines, &HashSet::new())
    }

    #[test]
    fn test_labeled_address() {
        let matched = scan(&["住所：東京都港区六本木1-2-3"]).unwrap();
        assert_eq!(matched.value, "東京都港区六本木1-2-3");
        assert_eq!(matched.lines, vec![0]);
    }

    #[test]
    fn test_postal_prefixed_address() {
        let matched = scan(&["〒220-0012 神奈川県横浜市西区みなとみらい2-2-1"]).unwrap();
        assert_eq!(matched.value, "〒220-0012 神奈川県横浜市西区みなとみらい2-2-1");
    }

    #[test]
    fn test_prefecture_line_absorbs_block_number_continuation() {
        let matched = scan(&["東京都港区", "六本木1-2-3", "カフェ ABC"]).unwrap();
        assert_eq!(matched.value, "東京都港区六本木1-2-3");
        assert_eq!(matched.lines, vec![0, 1]);
    }

    #[test]
    fn test_floor_marker_continuation() {
        let matched = scan(&["住所 大阪府大阪市北区梅田1-1-3", "大阪駅前ビル 2F"]).unwrap();
        assert_eq!(matched.value, "大阪府大阪市北区梅田1-1-3大阪駅前ビル 2F");
        assert_eq!(matched.lines, vec![0, 1]);
    }

    #[test]
    fn test_plain_text_line_is_not_absorbed() {
        let matched = scan(&["東京都渋谷区道玄坂", "渋谷食堂"]).unwrap();
        assert_eq!(matched.value, "東京都渋谷区道玄坂");
        assert_eq!(matched.lines, vec![0]);
    }

    #[test]
    fn test_claimed_continuation_stays_unclaimed() {
        let lines = vec!["東京都港区".to_string(), "045-123-4567".to_string()];
        let used: HashSet<usize> = [1].into_iter().collect();
        let matched = AddressPass.scan(&lines, &used).unwrap();

        assert_eq!(matched.value, "東京都港区");
        assert_eq!(matched.lines, vec![0]);
    }

    #[test]
    fn test_no_address_shape() {
        assert!(scan(&["アパ社長カレー", "TEL 045-123-4567"]).is_none());
    }
}
