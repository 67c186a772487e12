use std::fmt;

/// Identity of one modal run. Ticks carry it so a reopened modal ignores
/// ticks scheduled by the previous run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out strictly increasing session ids. The application owns one and
/// passes it to every modal it opens.
#[derive(Debug, Default)]
pub struct SessionFactory {
    last: u64,
}

impl SessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> SessionId {
        self.last += 1;
        SessionId(self.last)
    }
}
