use crate::ConvertError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub revision: u32,
}

impl Version {
    pub fn new(major: u32, minor: u32, revision: u32) -> Self {
        Version {
            major,
            minor,
            revision,
        }
    }

    /// `major.minor.revision` in the top three bytes, low byte zero.
    pub fn pack(&self) -> Result<u32, ConvertError> {
        for (part, value) in [
            ("major", self.major),
            ("minor", self.minor),
            ("revision", self.revision),
        ] {
            if value > 0xff {
                return Err(ConvertError::Encoding(format!(
                    "version {part} {value} (exceeds 255)"
                )));
            }
        }
        Ok((self.major << 24) | (self.minor << 16) | (self.revision << 8))
    }

    pub fn unpack(packed: u32) -> Self {
        Version {
            major: packed >> 24,
            minor: (packed >> 16) & 0xff,
            revision: (packed >> 8) & 0xff,
        }
    }
}

/// Descriptive information stored alongside the executable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub version: Version,
    pub author: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub targets: Vec<u32>,
}

impl Metadata {
    /// The strings in the order they are written, empty ones skipped.
    pub fn infos(&self) -> impl Iterator<Item = (InfoField, &str)> + '_ {
        [
            (InfoField::Title, &self.title),
            (InfoField::Author, &self.author),
            (InfoField::Summary, &self.summary),
            (InfoField::Description, &self.description),
        ]
        .into_iter()
        .filter_map(|(field, text)| match text.as_deref() {
            Some(text) if !text.is_empty() => Some((field, text)),
            _ => None,
        })
    }

    /// A leading 0 id means "no particular target".
    pub fn effective_targets(&self) -> &[u32] {
        match self.targets.first() {
            None | Some(0) => &[],
            Some(_) => &self.targets,
        }
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        self.version.pack()?;
        for (field, text) in self.infos() {
            if text.contains('\0') {
                return Err(ConvertError::Encoding(format!(
                    "{} (contains a NUL byte)",
                    field.name()
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    Author,
    Title,
    Summary,
    Description,
}

impl InfoField {
    pub fn name(self) -> &'static str {
        match self {
            InfoField::Author => "author",
            InfoField::Title => "title",
            InfoField::Summary => "summary",
            InfoField::Description => "description",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_version() {
        assert_eq!(Version::new(1, 2, 3).pack().unwrap(), 0x0102_0300);
        assert_eq!(Version::unpack(0x0102_0300), Version::new(1, 2, 3));
        assert!(matches!(
            Version::new(256, 0, 0).pack(),
            Err(ConvertError::Encoding(_))
        ));
    }

    #[test]
    fn infos_in_write_order() {
        let metadata = Metadata {
            author: Some("me".into()),
            title: Some("Demo".into()),
            summary: Some(String::new()),
            description: Some("long".into()),
            ..Metadata::default()
        };

        let fields: Vec<_> = metadata.infos().collect();
        assert_eq!(
            fields,
            [
                (InfoField::Title, "Demo"),
                (InfoField::Author, "me"),
                (InfoField::Description, "long"),
            ]
        );
    }

    #[test]
    fn target_sentinel() {
        let mut metadata = Metadata::default();
        assert!(metadata.effective_targets().is_empty());

        metadata.targets = vec![0];
        assert!(metadata.effective_targets().is_empty());

        metadata.targets = vec![0, 0x0012_3400];
        assert!(metadata.effective_targets().is_empty());

        metadata.targets = vec![0x0012_3400, 0x0012_3500];
        assert_eq!(metadata.effective_targets(), &[0x0012_3400, 0x0012_3500]);
    }

    #[test]
    fn embedded_nul_is_rejected() {
        let metadata = Metadata {
            author: Some("a\0b".into()),
            ..Metadata::default()
        };
        let err = metadata.validate().unwrap_err();
        assert_eq!(err.to_string(), "cannot encode author (contains a NUL byte)");
    }
}
