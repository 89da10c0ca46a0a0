//! Keyword-based category detection.

/// Ordered (label, keywords) table. The first entry with any keyword
/// in the text wins, so more specific cuisines sit above the generic
/// ones. ASCII keywords are lowercase; matching lowercases the text.
pub const CATEGORY_TABLE: &[(&str, &[&str])] = &[
    ("カレー", &["カレー", "curry", "スパイス"]),
    (
        "ラーメン",
        &["ラーメン", "らーめん", "ramen", "中華そば", "つけ麺"],
    ),
    ("カフェ", &["カフェ", "cafe", "coffee", "珈琲", "喫茶"]),
    ("寿司", &["寿司", "すし", "鮨", "sushi"]),
    ("焼肉", &["焼肉", "焼き肉", "ホルモン", "yakiniku"]),
    ("居酒屋", &["居酒屋", "酒場", "izakaya", "炉端"]),
    (
        "イタリアン",
        &["イタリアン", "italian", "パスタ", "ピザ", "pizza", "トラットリア"],
    ),
    ("中華", &["中華", "中国料理", "餃子", "点心"]),
    ("鍋", &["もつ鍋", "しゃぶしゃぶ", "すき焼き", "鍋"]),
    ("そば", &["そば", "蕎麦", "うどん", "soba", "udon"]),
    ("ベーカリー", &["ベーカリー", "パン", "bakery", "ブーランジェリー"]),
    ("ハンバーガー", &["バーガー", "burger"]),
    ("バー", &["バー", "bar", "ワイン", "wine"]),
    ("レストラン", &["レストラン", "restaurant", "食堂", "グリル"]),
];

/// Detect a category anywhere in the raw text.
///
/// Reads the full text rather than the per-line pool: keywords
/// inside lines claimed by other passes still count.
pub fn detect_category(text: &str) -> Option<String> {
    let haystack = text.to_lowercase();
    for (label, keywords) in CATEGORY_TABLE {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return Some((*label).to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_detects_cafe() {
        assert_eq!(detect_category("カフェ ABC").as_deref(), Some("カフェ"));
        assert_eq!(detect_category("COFFEE STAND").as_deref(), Some("カフェ"));
    }

    #[test]
    fn test_table_order_breaks_ties() {
        // Curry sits above cafe in the table.
        assert_eq!(
            detect_category("カレーも楽しめるカフェ").as_deref(),
            Some("カレー")
        );
    }

    #[test]
    fn test_tsukemen_counts_as_ramen() {
        assert_eq!(detect_category("つけ麺 大盛無料").as_deref(), Some("ラーメン"));
    }

    #[test]
    fn test_no_keyword() {
        assert_eq!(detect_category("駐車場あり"), None);
        assert_eq!(detect_category(""), None);
    }
}
