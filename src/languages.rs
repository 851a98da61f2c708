//! Languages a greeting can be written in.

use serde::Serialize;

/// One selectable language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    /// Stable identifier used on the command line.
    pub code: &'static str,
    /// English display name. This is what the model is told to write in.
    pub name: &'static str,
    /// Name of the language in its own script.
    pub native: &'static str,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.native)
    }
}

/// Code of the language selected when nothing else is asked for.
pub const DEFAULT_LANGUAGE: &str = "en";

const fn lang(code: &'static str, name: &'static str, native: &'static str) -> Language {
    Language { code, name, native }
}

/// Every language offered by the generator.
pub const LANGUAGES: &[Language] = &[
    lang("en", "English", "English"),
    lang("zh-CN", "Mandarin Chinese", "普通话"),
    lang("yue", "Canton Chinese", "廣東話"),
    lang("zh-TW", "Taiwanese Mandarin", "臺灣華語"),
    lang("hi", "Hindi", "हिन्दी"),
    lang("es", "Spanish", "Español"),
    lang("fr", "French", "Français"),
    lang("ar", "Arabic", "العربية"),
    lang("bn", "Bengali", "বাংলা"),
    lang("pt", "Portuguese", "Português"),
    lang("ru", "Russian", "Русский"),
    lang("ur", "Urdu", "اردو"),
    lang("id", "Indonesian", "Bahasa Indonesia"),
    lang("de", "German", "Deutsch"),
    lang("ja", "Japanese", "日本語"),
    lang("pcm", "Nigerian Pidgin", "Naijá"),
    lang("mr", "Marathi", "मराठी"),
    lang("te", "Telugu", "తెలుగు"),
    lang("tr", "Turkish", "Türkçe"),
    lang("ta", "Tamil", "தமிழ்"),
    lang("wuu", "Wu Chinese", "吴语"),
    lang("ko", "Korean", "한국어"),
    lang("vi", "Vietnamese", "Tiếng Việt"),
    lang("jv", "Javanese", "Basa Jawa"),
    lang("it", "Italian", "Italiano"),
    lang("arz", "Egyptian Arabic", "مصرى"),
    lang("ha", "Hausa", "Hausa"),
    lang("th", "Thai", "ไทย"),
    lang("gu", "Gujarati", "ગુજરાતી"),
    lang("kn", "Kannada", "ಕನ್ನಡ"),
    lang("fa", "Persian", "فارسی"),
    lang("bho", "Bhojpuri", "भोजपुरी"),
    lang("nan", "Hokkien", "閩南語"),
    lang("hak", "Hakka", "客家話"),
    lang("fil", "Filipino", "Filipino"),
    lang("pl", "Polish", "Polski"),
    lang("uk", "Ukrainian", "Українська"),
    lang("ml", "Malayalam", "മലയാളം"),
    lang("my", "Burmese", "မြန်မာဘာသာ"),
    lang("or", "Odia", "ଓଡ଼ିଆ"),
    lang("pa", "Punjabi", "ਪੰਜਾਬੀ"),
    lang("su", "Sundanese", "Basa Sunda"),
    lang("ro", "Romanian", "Română"),
    lang("nl", "Dutch", "Nederlands"),
    lang("ps", "Pashto", "پښتو"),
    lang("yo", "Yoruba", "Yorùbá"),
    lang("uz", "Uzbek", "Oʻzbekcha"),
    lang("ms", "Malay", "Bahasa Melayu"),
    lang("am", "Amharic", "አማርኛ"),
    lang("ig", "Igbo", "Igbo"),
    lang("ne", "Nepali", "नेपाली"),
    lang("si", "Sinhala", "සිංහල"),
    lang("km", "Khmer", "ខ្មែរ"),
    lang("tk", "Turkmen", "Türkmençe"),
    lang("as", "Assamese", "অসমীয়া"),
    lang("mad", "Madurese", "Basa Madhura"),
    lang("so", "Somali", "Soomaali"),
    lang("mai", "Maithili", "मैथिली"),
    lang("mag", "Magahi", "मगही"),
    lang("hu", "Hungarian", "Magyar"),
    lang("ctg", "Chittagonian", "চাটগাঁইয়া"),
    lang("sd", "Sindhi", "سنڌي"),
    lang("zu", "Zulu", "isiZulu"),
    lang("cs", "Czech", "Čeština"),
    lang("el", "Greek", "Ελληνικά"),
    lang("ceb", "Cebuano", "Sinugboanon"),
    lang("sv", "Swedish", "Svenska"),
    lang("az", "Azerbaijani", "Azərbaycanca"),
    lang("kk", "Kazakh", "Қазақ тілі"),
    lang("be", "Belarusian", "Беларуская"),
    lang("he", "Hebrew", "עברית"),
    lang("sr", "Serbian", "Српски"),
    lang("bg", "Bulgarian", "Български"),
    lang("hr", "Croatian", "Hrvatski"),
    lang("da", "Danish", "Dansk"),
    lang("fi", "Finnish", "Suomi"),
    lang("sk", "Slovak", "Slovenčina"),
    lang("no", "Norwegian", "Norsk"),
    lang("ka", "Georgian", "ქართული"),
    lang("hy", "Armenian", "Հայերեն"),
    lang("lt", "Lithuanian", "Lietuvių"),
    lang("lv", "Latvian", "Latviešu"),
    lang("et", "Estonian", "Eesti"),
    lang("sl", "Slovenian", "Slovenščina"),
    lang("sq", "Albanian", "Shqip"),
    lang("mk", "Macedonian", "Македонски"),
    lang("bs", "Bosnian", "Bosanski"),
    lang("ca", "Catalan", "Català"),
    lang("eu", "Basque", "Euskara"),
    lang("gl", "Galician", "Galego"),
    lang("ga", "Irish", "Gaeilge"),
    lang("cy", "Welsh", "Cymraeg"),
    lang("is", "Icelandic", "Íslenska"),
    lang("mt", "Maltese", "Malti"),
    lang("lb", "Luxembourgish", "Lëtzebuergesch"),
    lang("sw", "Swahili", "Kiswahili"),
    lang("xh", "Xhosa", "isiXhosa"),
    lang("af", "Afrikaans", "Afrikaans"),
    lang("rw", "Kinyarwanda", "Ikinyarwanda"),
    lang("mg", "Malagasy", "Malagasy"),
    lang("lo", "Lao", "ລາວ"),
    lang("mn", "Mongolian", "Монгол"),
    lang("bo", "Tibetan", "བོད་སྐད"),
    lang("ug", "Uyghur", "ئۇيغۇرچە"),
    lang("ky", "Kyrgyz", "Кыргызча"),
    lang("tg", "Tajik", "Тоҷикӣ"),
    lang("ku", "Kurdish", "Kurdî"),
    lang("haw", "Hawaiian", "ʻŌlelo Hawaiʻi"),
    lang("mi", "Maori", "Te Reo Māori"),
    lang("sm", "Samoan", "Gagana Samoa"),
    lang("eo", "Esperanto", "Esperanto"),
    lang("la", "Latin", "Latina"),
];

/// Looks up a language by its code. Codes are matched exactly.
pub fn find(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.code == code)
}

/// The default language, English.
pub fn default_language() -> &'static Language {
    &LANGUAGES[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_unique() {
        let codes: HashSet<_> = LANGUAGES.iter().map(|l| l.code).collect();
        assert_eq!(codes.len(), LANGUAGES.len());
        assert!(LANGUAGES.len() >= 100);
    }

    #[test]
    fn test_default_is_english() {
        assert_eq!(default_language().code, DEFAULT_LANGUAGE);
        assert_eq!(default_language().name, "English");
    }

    #[test]
    fn test_chinese_variants_present() {
        assert_eq!(find("yue").unwrap().name, "Canton Chinese");
        assert_eq!(find("zh-TW").unwrap().name, "Taiwanese Mandarin");
        assert_eq!(find("zh-CN").unwrap().name, "Mandarin Chinese");
    }

    #[test]
    fn test_find_is_exact() {
        assert!(find("EN").is_none());
        assert!(find("").is_none());
        assert_eq!(find("fr").unwrap().to_string(), "French (Français)");
    }
}
