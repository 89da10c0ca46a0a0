//! Price range extraction.

use std::collections::HashSet;

use super::patterns::PRICE_RANGE;
use super::{FieldPass, LineMatch};

/// Price range pass. Only explicit ranges count, never a lone price.
pub struct PricePass;

impl FieldPass for PricePass {
    fn field(&self) -> &'static str {
        "price_range"
    }

    fn scan(&self, lines: &[String], used: &HashSet<usize>) -> Option<LineMatch> {
        for (idx, line) in lines.iter().enumerate() {
            if used.contains(&idx) {
                continue;
            }
            if let Some(found) = PRICE_RANGE.find(line) {
                return Some(LineMatch::single(found.as_str().to_string(), idx));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(lines: &[&str]) -> Option<LineMatch> {
        let lines: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        PricePass.scan(&lines, &HashSet::new())
    }

    #[test]
    fn test_yen_symbol_range() {
        let matched = scan(&["ディナー ¥4,000〜¥6,000"]).unwrap();
        assert_eq!(matched.value, "¥4,000〜¥6,000");
    }

    #[test]
    fn test_yen_suffix_range() {
        let matched = scan(&["ランチ 1000円〜1500円"]).unwrap();
        assert_eq!(matched.value, "1000円〜1500円");
    }

    #[test]
    fn test_single_price_is_skipped() {
        assert!(scan(&["コーヒー ¥500", "カレー 800円"]).is_none());
    }
}
