/// Suffixes of resources that are never pages worth crawling
///
/// Covers images, audio, video, archives, executables, stylesheets, scripts
/// and binary documents.
const NON_PAGE_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "svg", "ico", // images
    "mp3", "wav", "ogg", // audio
    "mp4", "webm", // video
    "gz", "zip", "jar", // archives
    "exe", // executables
    "css", "js", "ttf", // styles, scripts, fonts
    "pdf", // documents
];

/// Returns true if the address ends in a known non-page extension
///
/// The match is case-insensitive and anchored at the end of the string.
///
/// # Examples
///
/// ```
/// use driftnet::url::is_non_page;
///
/// assert!(is_non_page("https://cdn.example/logo.PNG"));
/// assert!(is_non_page("http://assets.js"));
/// assert!(!is_non_page("https://example.com"));
/// ```
pub fn is_non_page(address: &str) -> bool {
    let lower = address.to_ascii_lowercase();
    let Some((_, suffix)) = lower.rsplit_once('.') else {
        return false;
    };
    NON_PAGE_EXTENSIONS.contains(&suffix)
}
