//! Common regex patterns for Japanese POI signage text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Phone patterns. Japanese word boundaries are unreliable with \b
    // (kanji and digits are both word characters), so the standalone
    // shapes guard with explicit non-digit context instead.
    pub static ref PHONE_LABELED: Regex = Regex::new(
        r"(?i)(?:TEL|ＴＥＬ|電話番号|電話|℡|☎)[\s:：.．]*([0-9０-９()（）ー−-]{8,})"
    ).unwrap();

    pub static ref PHONE_LEADING_ZERO: Regex = Regex::new(
        r"(?:^|[^0-9０-９])(0[0-9]{1,4}[-ー−()（）][0-9]{1,4}[-ー−()（）][0-9]{3,4})(?:[^0-9０-９]|$)"
    ).unwrap();

    pub static ref PHONE_GENERIC: Regex = Regex::new(
        r"(?:^|[^0-9０-９])([0-9]{2,4}-[0-9]{2,4}-[0-9]{3,4})(?:[^0-9０-９]|$)"
    ).unwrap();

    // Address patterns
    pub static ref ADDRESS_LABELED: Regex = Regex::new(
        r"(?:住所|所在地)[\s:：]*(.+)"
    ).unwrap();

    pub static ref ADDRESS_POSTAL: Regex = Regex::new(
        r"^〒?\s*[0-9０-９]{3}[-ー−][0-9０-９]{4}\s*(.*)"
    ).unwrap();

    pub static ref PREFECTURE_START: Regex = Regex::new(
        r"^(?:北海道|青森県|岩手県|宮城県|秋田県|山形県|福島県|茨城県|栃木県|群馬県|埼玉県|千葉県|東京都|神奈川県|新潟県|富山県|石川県|福井県|山梨県|長野県|岐阜県|静岡県|愛知県|三重県|滋賀県|京都府|大阪府|兵庫県|奈良県|和歌山県|鳥取県|島根県|岡山県|広島県|山口県|徳島県|香川県|愛媛県|高知県|福岡県|佐賀県|長崎県|熊本県|大分県|宮崎県|鹿児島県|沖縄県)"
    ).unwrap();

    // Address continuation shapes (second OCR line of a split address)
    pub static ref CONTINUATION_START: Regex = Regex::new(
        r"^[0-9０-９ー−-]"
    ).unwrap();

    // Block numbering like 1-2-3, also mid-line as in 六本木1-2-3
    pub static ref BLOCK_NUMBER: Regex = Regex::new(
        r"[0-9０-９]+[-ー−][0-9０-９]+"
    ).unwrap();

    pub static ref FLOOR_MARKER: Regex = Regex::new(
        r"[0-9０-９]\s*(?:[fFｆＦ]|階)"
    ).unwrap();

    // Business hours
    pub static ref HOURS_LABELED: Regex = Regex::new(
        r"(?i)(?:営業時間|営業|open)[\s:：]*(.*)"
    ).unwrap();

    pub static ref HOURS_BARE: Regex = Regex::new(
        r"^\s*[0-2]?[0-9][:：][0-5][0-9]\s*[〜~～ー−-]\s*[0-2]?[0-9][:：][0-5][0-9]"
    ).unwrap();

    pub static ref TIME_TOKEN: Regex = Regex::new(
        r"[0-9０-９]{1,2}[:：][0-9０-９]{2}"
    ).unwrap();

    // Price range: ¥N〜¥N or N円〜N円
    pub static ref PRICE_RANGE: Regex = Regex::new(
        r"(?:[¥￥][0-9０-９,，]+|[0-9０-９,，]+円)\s*[〜~～ー−-]\s*(?:[¥￥][0-9０-９,，]+|[0-9０-９,，]+円)"
    ).unwrap();

    // Name-pass filters
    pub static ref URL_OR_HANDLE: Regex = Regex::new(
        r"(?i)(?:https?://|www\.)[^\s]+|@[a-z0-9_.]{2,}"
    ).unwrap();

    pub static ref NUMERIC_LINE: Regex = Regex::new(
        r"^[0-9０-９ー−\s-]+$"
    ).unwrap();

    // Labeled plain-text reply lines (degraded model output)
    pub static ref NAME_LABELED: Regex = Regex::new(
        r"(?:施設名|店名|名称)[\s:：]*(.+)"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_labeled_captures_number() {
        let caps = PHONE_LABELED.captures("TEL 045-123-4567").unwrap();
        assert_eq!(&caps[1], "045-123-4567");

        let caps = PHONE_LABELED.captures("電話：０３（１２３４）５６７８").unwrap();
        assert_eq!(&caps[1], "０３（１２３４）５６７８");
    }

    #[test]
    fn test_phone_leading_zero_needs_digit_context() {
        assert!(PHONE_LEADING_ZERO.is_match("045-123-4567"));
        assert!(PHONE_LEADING_ZERO.is_match("045-123-4567 まで"));
        assert!(!PHONE_LEADING_ZERO.is_match("145-123-4567"));
    }

    #[test]
    fn test_prefecture_start_anchors_to_line_head() {
        assert!(PREFECTURE_START.is_match("東京都港区六本木"));
        assert!(PREFECTURE_START.is_match("神奈川県横浜市西区"));
        assert!(!PREFECTURE_START.is_match("本店は東京都港区"));
    }

    #[test]
    fn test_hours_bare_shape() {
        assert!(HOURS_BARE.is_match("11:00〜22:00"));
        assert!(HOURS_BARE.is_match("9:30~18:00 (L.O.17:30)"));
        assert!(!HOURS_BARE.is_match("定休日 水曜"));
    }

    #[test]
    fn test_price_range_shapes() {
        assert!(PRICE_RANGE.is_match("¥1,000〜¥2,000"));
        assert!(PRICE_RANGE.is_match("1000円〜2000円"));
        assert!(!PRICE_RANGE.is_match("¥1,000"));
    }
}
