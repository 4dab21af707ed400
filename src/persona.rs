//! Scripted texts and prompt construction for the astrologer persona
//!
//! Everything the assistant says without consulting the model lives here,
//! along with the system instructions sent when it does.

mod rashi;

pub use rashi::{Rashi, UnknownRashi};

use crate::state_machine::Profile;

/// Opening line of every session, asking for the visitor's full name
pub const GREETING: &str = "नमस्ते! म तपाईँको वैदिक एआई सहायक 'ज्योतिषी बाजे' हुँ। तपाईँको व्यक्तिगत राशिफल र ग्रह दशाको सही गणना गर्नका लागि, कृपया पहिले तपाईँको **पूरा नाम** भन्नुहोस्।";

/// Sent when the model answers with nothing
pub const EMPTY_REPLY: &str = "माफ गर्नुहोस्, अहिले मैले जवाफ दिन सकिन।";

pub const GENERIC_APOLOGY: &str = "सर्भरमा केही समस्या आयो।";

pub const QUOTA_APOLOGY: &str = "तपाईँको API कोटा सकिएको छ। कृपया अर्को Key छनोट गर्नुहोस्।";

pub const CREDENTIAL_UPDATED: &str = "API Key अपडेट भयो! अब तपाईँ सोधपुछ सुरु गर्न सक्नुहुन्छ।";

/// Shown in a horoscope slot while its request is in flight
pub const HOROSCOPE_PENDING: &str = "गणना हुँदैछ...";

pub const HOROSCOPE_EMPTY: &str = "विवरण प्राप्त गर्न सकिएन।";

pub const HOROSCOPE_FAILED: &str = "विवरण प्राप्त गर्न सकिएन। कृपया फेरि प्रयास गर्नुहोस्।";

/// Default prebuilt voice for spoken replies
pub const DEFAULT_VOICE: &str = "Charon";

const CHAT_INSTRUCTION: &str = "तपाईँ एक अनुभवी वैदिक ज्योतिषी हुनुहुन्छ। तपाईँको नाम 'ज्योतिषी बाजे' हो। तपाईँले प्रयोगकर्ताको नाम र जन्म मितिको आधारमा उनीहरूको ग्रह दशा र भविष्यको बारेमा सल्लाह दिनुहुन्छ। सधैँ विनम्र र आध्यात्मिक भाषा प्रयोग गर्नुहोस्।";

const HOROSCOPE_INSTRUCTION: &str = "तपाईँ एक अनुभवी वैदिक ज्योतिषी हुनुहुन्छ। राशिफल बताउँदा प्रयोगकर्ताको नाम र जन्म मितिको आधारमा उनीहरूको ग्रह दशा र भविष्यको बारेमा संक्षिप्त तर स्पष्ट जानकारी दिनुहोस्।";

const SPEECH_DIRECTION: &str = "Say in a wise, elderly Nepali voice: ";

/// Follow-up once the name is known
pub fn ask_date_of_birth(name: &str) -> String {
    format!(
        "धन्यवाद {name} ज्यू! अब कृपया तपाईँको **जन्म मिति (Date of Birth)** भन्नुहोस् (जस्तै: २०५०-०१-०१) ताकि म तपाईँको ग्रह र नक्षत्रको सही गणना गर्न सकूँ।"
    )
}

/// Confirmation once the date of birth is known
pub fn confirm_ready(date_of_birth: &str) -> String {
    format!(
        "उत्कृष्ट! अब म तपाईँको विवरण सुरक्षित गरेको छु। तपाईँको जन्म मिति {date_of_birth} को आधारमा म अब तपाईँलाई व्यक्तिगत ज्योतिषीय परामर्श दिन तयार छु। तपाईँ के जान्न चाहनुहुन्छ?"
    )
}

/// Visitor details injected ahead of a system instruction.
///
/// Empty when nothing is known yet; the date stays blank until collected.
pub fn profile_context(profile: Option<&Profile>) -> String {
    match profile {
        Some(p) => format!(
            "प्रयोगकर्ताको विवरण: नाम: {}, जन्म मिति: {}। ",
            p.name,
            p.date_of_birth.as_deref().unwrap_or("")
        ),
        None => String::new(),
    }
}

pub fn chat_instruction(profile: Option<&Profile>) -> String {
    format!("{}{CHAT_INSTRUCTION}", profile_context(profile))
}

pub fn horoscope_instruction(profile: Option<&Profile>) -> String {
    format!("{}{HOROSCOPE_INSTRUCTION}", profile_context(profile))
}

pub fn horoscope_prompt(rashi: Rashi) -> String {
    format!("{} राशिको आजको विस्तृत राशिफल नेपालीमा भन्नुहोस्।", rashi.label())
}

/// Prompt for the audio modality. Markdown emphasis is dropped so it is not read aloud.
pub fn speech_prompt(text: &str) -> String {
    format!("{SPEECH_DIRECTION}{}", text.replace("**", ""))
}
