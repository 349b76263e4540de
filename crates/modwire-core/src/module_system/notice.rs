use std::fmt;

/// Severity of an advisory notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Debug,
    Message,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeLevel::Debug => write!(f, "debug"),
            NoticeLevel::Message => write!(f, "message"),
            NoticeLevel::Warning => write!(f, "warning"),
            NoticeLevel::Error => write!(f, "error"),
        }
    }
}

/// An advisory notice raised during an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// Buffer of notices raised by the engine.
///
/// Every notice is also forwarded to the `log` facade. Debug notices are
/// only buffered when debug mode is on.
#[derive(Debug, Default)]
pub struct Notices {
    items: Vec<Notice>,
    debug: bool,
}

impl Notices {
    pub fn new(debug: bool) -> Self {
        Self { items: Vec::new(), debug }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn message(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::info!("{}", text);
        self.push(NoticeLevel::Message, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::warn!("{}", text);
        self.push(NoticeLevel::Warning, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::error!("{}", text);
        self.push(NoticeLevel::Error, text);
    }

    pub fn debug(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::debug!("{}", text);
        if self.debug {
            self.push(NoticeLevel::Debug, text);
        }
    }

    fn push(&mut self, level: NoticeLevel, text: String) {
        self.items.push(Notice { level, text });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    /// Notices at exactly `level`
    pub fn at_level(&self, level: NoticeLevel) -> Vec<&Notice> {
        self.items.iter().filter(|n| n.level == level).collect()
    }

    pub fn warnings(&self) -> Vec<&Notice> {
        self.at_level(NoticeLevel::Warning)
    }

    pub fn errors(&self) -> Vec<&Notice> {
        self.at_level(NoticeLevel::Error)
    }

    /// Whether any notice's text contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.items.iter().any(|n| n.text.contains(needle))
    }

    /// Remove and return all buffered notices
    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.items)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
