use dvb_sys as sys;

/// Ordered `(command, value)` pairs submitted to the frontend in one call.
///
/// Some drivers are sensitive to ordering: `DTV_CLEAR` has to come before
/// `DTV_DELIVERY_SYSTEM`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertySet {
    props: Vec<(u32, u32)>,
}

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a set that discards the previous tuning configuration.
    pub fn cleared() -> Self {
        Self::new().with(sys::DTV_CLEAR, 0u32)
    }

    pub fn with(mut self, cmd: u32, value: impl Into<u32>) -> Self {
        self.props.push((cmd, value.into()));
        self
    }

    pub fn as_slice(&self) -> &[(u32, u32)] {
        &self.props
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Value of the first occurrence of `cmd`.
    pub fn get(&self, cmd: u32) -> Option<u32> {
        self.props.iter().find(|(c, _)| *c == cmd).map(|&(_, v)| v)
    }
}
