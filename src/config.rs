use std::borrow::Cow;

/// The clinic mark drawn when the caller supplies no logo of its own.
pub(crate) const DEFAULT_LOGO: &[u8] = include_bytes!("../assets/clinic-logo.png");

/// Per-render configuration. The header logo resolves in two steps: an
/// explicit per-report image wins, otherwise the injectable fallback asset is
/// used. Setting `fallback_logo` to `None` renders without any logo.
#[derive(Clone, Debug)]
pub struct ReportConfig {
    /// Raw JPEG or PNG bytes supplied with this report.
    pub logo: Option<Vec<u8>>,
    /// Asset used when `logo` is absent. Tests substitute this.
    pub fallback_logo: Option<Cow<'static, [u8]>>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            logo: None,
            fallback_logo: Some(Cow::Borrowed(DEFAULT_LOGO)),
        }
    }
}

impl ReportConfig {
    /// Configuration that never draws a header image.
    pub fn without_logo() -> Self {
        ReportConfig {
            logo: None,
            fallback_logo: None,
        }
    }

    pub(crate) fn effective_logo(&self) -> Option<&[u8]> {
        self.logo
            .as_deref()
            .or_else(|| self.fallback_logo.as_deref())
    }
}
