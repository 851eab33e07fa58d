use regex::Regex;

/// Breeds the bundled model was trained on, in class id order.
pub const DOG_BREEDS: [&str; 15] = [
    "Beagle",
    "Chihuahua",
    "Doberman",
    "French_bulldog",
    "German_shepherd",
    "Golden_retriever",
    "Labrador_retriever",
    "Maltese_dog",
    "Pomeranian",
    "Pug",
    "Rottweiler",
    "Samoyed",
    "Shih-Tzu",
    "Siberian_husky",
    "Standard_poodle",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ClassNames {
    names: Vec<String>,
}

impl Default for ClassNames {
    fn default() -> Self {
        Self::from(&DOG_BREEDS[..])
    }
}

impl From<&[&str]> for ClassNames {
    fn from(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|x| x.to_string()).collect(),
        }
    }
}

impl From<Vec<String>> for ClassNames {
    fn from(names: Vec<String>) -> Self {
        Self { names }
    }
}

impl ClassNames {
    /// Label for `class_id`, `Dog_<id>` when the table is shorter than the model's class count.
    pub fn name(&self, class_id: usize) -> String {
        match self.names.get(class_id) {
            Some(name) => name.clone(),
            None => format!("Dog_{}", class_id),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Parses the `names` entry Ultralytics writes into ONNX metadata.
    /// String format: `{0: 'Beagle', 1: 'Chihuahua', ..., 14: 'Standard_poodle'}`
    pub fn from_metadata(names: &str) -> Option<Self> {
        let re = Regex::new(r#"(['"])([-()\w '"]+)(['"])"#).ok()?;
        let names: Vec<String> = re
            .captures_iter(names)
            .map(|x| x.extract())
            .map(|(_, [_, name, _])| name.to_string())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(Self { names })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_table_resolves_breeds() {
        let names = ClassNames::default();
        assert_eq!(names.len(), 15);
        assert_eq!(names.name(0), "Beagle");
        assert_eq!(names.name(14), "Standard_poodle");
    }

    #[test]
    fn out_of_range_ids_are_synthesized() {
        let names = ClassNames::default();
        assert_eq!(names.name(15), "Dog_15");
        assert_eq!(names.name(99), "Dog_99");
    }

    #[test]
    fn parses_metadata_names() {
        let names = ClassNames::from_metadata("{0: 'Beagle', 1: 'Shih-Tzu', 2: 'Golden_retriever'}").unwrap();
        assert_eq!(names.names(), &["Beagle", "Shih-Tzu", "Golden_retriever"]);
        assert!(ClassNames::from_metadata("{}").is_none());
    }
}
