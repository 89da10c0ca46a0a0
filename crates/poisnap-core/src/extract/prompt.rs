//! Prompt templates for model-backed extraction.

/// Shared output contract. Backends must return one JSON object with
/// exactly these six keys, each a string or null.
const OUTPUT_CONTRACT: &str = "\
抽出した情報を、次の6つのキーだけを持つJSONオブジェクトとして返してください。\n\
キー: name, address, phone, hours, category, priceRange\n\
値は文字列またはnullです。該当しない項目はnullにしてください。\n\
JSON以外の説明文は書かないでください。";

/// Instruction template for text-mode extraction. The OCR text is
/// appended verbatim.
pub fn text_prompt(ocr_text: &str) -> String {
    format!(
        "あなたは店舗の看板やメニューの文字起こしから店舗情報を抽出するアシスタントです。\n\
         以下のテキストは看板のOCR結果で、上から順に読み取られた行です。\n\n\
         {OUTPUT_CONTRACT}\n\n\
         テキスト:\n{ocr_text}"
    )
}

/// Instruction template for image-mode extraction.
pub fn image_prompt() -> String {
    format!(
        "この画像は店舗の看板または店頭の写真です。\n\
         画像に写っている店舗情報を読み取ってください。\n\n\
         {OUTPUT_CONTRACT}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_prompt_carries_ocr_text_verbatim() {
        let prompt = text_prompt("アパ社長カレー\nTEL 045-123-4567");
        assert!(prompt.contains("アパ社長カレー\nTEL 045-123-4567"));
    }

    #[test]
    fn test_prompts_name_all_six_keys() {
        for prompt in [text_prompt("x"), image_prompt()] {
            for key in ["name", "address", "phone", "hours", "category", "priceRange"] {
                assert!(prompt.contains(key), "missing key {key}");
            }
        }
    }
}
