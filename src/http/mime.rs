//! Content types for served files.
//!
//! Only two extensions are known. Everything else is served without a
//! `Content-Type` header.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Html,
    Jpeg,
}

impl ContentType {
    /// Looks at the text from the last `.` in `name`. Matching is case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use filegate::http::mime::ContentType;
    /// assert_eq!(ContentType::from_name("file1.html"), Some(ContentType::Html));
    /// assert_eq!(ContentType::from_name("photo.JPG"), None);
    /// assert_eq!(ContentType::from_name("README"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Self> {
        let dot = name.rfind('.')?;
        match &name[dot..] {
            ".html" => Some(ContentType::Html),
            ".jpg" => Some(ContentType::Jpeg),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "text/html",
            ContentType::Jpeg => "image/jpeg",
        }
    }
}
