//! Shared constants/setters for things
//!

/// Label used when the vision model can't tell us what was drawn
pub const DEFAULT_LABEL: &str = "abstract drawing";

/// Instructions sent alongside the doodle to the vision model
pub const RECOGNITION_PROMPT: &str = r#"Look at this simple doodle/drawing and identify what object or thing it represents.
Give a clear, simple description of what you see. Be specific but concise.
If you're not sure, make your best guess based on the shapes and lines.
Respond with just the name/description of the object, nothing else.
Examples: "cat", "house", "tree", "car", "person", "flower""#;

/// Art styles the prompt composer picks from
pub const STYLES: [&str; 8] = [
    "stunning digital art",
    "beautiful oil painting",
    "dreamy watercolor",
    "bold pop art style",
    "magical fantasy art",
    "vibrant cartoon style",
    "elegant minimalist art",
    "dramatic cinematic style",
];

/// Moods the prompt composer picks from
pub const MOODS: [&str; 8] = [
    "magical and enchanting",
    "warm and cozy",
    "bold and vibrant",
    "dreamy and ethereal",
    "dramatic and moody",
    "cheerful and bright",
    "mysterious and atmospheric",
    "elegant and sophisticated",
];

/// URL prefix the generated images are served under
pub const GENERATED_IMAGES_PATH: &str = "/generated_images";

/// Largest `POST /generate` body accepted. A base64 canvas export runs to a
/// few megabytes, above axum's 2 MB default.
pub const MAX_DRAWING_BYTES: usize = 10 * 1024 * 1024;

/// Generated artifact filename prefix
pub const ARTIFACT_PREFIX: &str = "doodle_art_";

/// chrono format for the artifact timestamp
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// JPEG quality used for stored artifacts
pub const ARTIFACT_JPEG_QUALITY: u8 = 95;

/// How many later seconds we try when an artifact filename is taken
pub const ARTIFACT_NAME_ATTEMPTS: u32 = 60;

/// MIME type requested from the image model
pub const GENERATION_MIME_TYPE: &str = "image/jpeg";

/// Aspect ratio requested from the image model
pub const GENERATION_ASPECT_RATIO: &str = "1:1";

/// Person generation policy sent to the image model
pub const GENERATION_PERSON_POLICY: &str = "allow_adult";

/// Timeout for a single model API call, in seconds.
pub const MODEL_REQUEST_TIMEOUT_SECONDS: u64 = 120;
