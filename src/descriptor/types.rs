//! In-memory service descriptor.

/// One named section of a descriptor: options in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSection {
    name: String,
    options: Vec<(String, String)>,
}

impl DescriptorSection {
    /// Create an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    /// Section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an option value. Names are matched case-sensitively.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(name, _)| name == option)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the section defines the option.
    pub fn contains(&self, option: &str) -> bool {
        self.get(option).is_some()
    }

    /// Iterate over `(name, value)` pairs in section order.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of options in the section.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the section has no options.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Set an option, keeping the position of an existing one.
    ///
    /// Returns `true` when the option was already present.
    pub(crate) fn set(&mut self, option: &str, value: &str) -> bool {
        match self.options.iter_mut().find(|(name, _)| name == option) {
            Some((_, existing)) => {
                *existing = value.to_string();
                true
            }
            None => {
                self.options.push((option.to_string(), value.to_string()));
                false
            }
        }
    }
}

/// Parsed key/value configuration of one service, grouped by section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceDescriptor {
    sections: Vec<DescriptorSection>,
}

impl ServiceDescriptor {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a descriptor holding a single section.
    ///
    /// ```
    /// use winsvc_agent::descriptor::ServiceDescriptor;
    ///
    /// let descriptor = ServiceDescriptor::from_pairs(
    ///     "service",
    ///     [("DisplayName", "svc1"), ("Application", "C:\\app.exe")],
    /// );
    /// assert_eq!(descriptor.get("service", "DisplayName"), Some("svc1"));
    /// ```
    pub fn from_pairs<I, K, V>(section: &str, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut descriptor = Self::new();
        let target = descriptor.section_mut(section);
        for (name, value) in pairs {
            target.set(name.as_ref(), value.as_ref());
        }
        descriptor
    }

    /// Get a section by name.
    pub fn section(&self, name: &str) -> Option<&DescriptorSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Whether the descriptor has the named section.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Look up a single option.
    pub fn get(&self, section: &str, option: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(option))
    }

    /// Section names in file order.
    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    /// Get a section for modification, appending it when absent.
    pub(crate) fn section_mut(&mut self, name: &str) -> &mut DescriptorSection {
        let index = match self.sections.iter().position(|s| s.name == name) {
            Some(index) => index,
            None => {
                self.sections.push(DescriptorSection::new(name));
                self.sections.len() - 1
            }
        };
        &mut self.sections[index]
    }
}
