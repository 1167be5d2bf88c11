use uuid::Uuid;

/// Generates prefixed record ids, e.g. `o-1f3a9c2b7d`
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    pub const ORGANIZATION: &'static str = "o";
    pub const USER: &'static str = "u";

    pub fn generate(&self, prefix: &str) -> String {
        let raw = Uuid::new_v4().simple().to_string();
        format!("{}-{}", prefix, &raw[..10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_carry_prefix_and_are_unique() {
        let ids = IdGenerator;
        let first = ids.generate(IdGenerator::ORGANIZATION);
        let second = ids.generate(IdGenerator::ORGANIZATION);

        assert!(first.starts_with("o-"));
        assert_eq!(first.len(), 12);
        assert_ne!(first, second);
    }
}
