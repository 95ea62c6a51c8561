use rand::Rng;

/// Generates an identifier such as `APT048213` that `is_taken` does not
/// already claim.
pub fn generate_id<F>(prefix: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut rng = rand::thread_rng();
    loop {
        let candidate = format!("{}{:06}", prefix, rng.gen_range(0..1_000_000u32));
        if !is_taken(&candidate) {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_carry_prefix_and_avoid_taken_values() {
        let mut taken = HashSet::new();
        for _ in 0..200 {
            let id = generate_id("APT", |c| taken.contains(c));
            assert!(id.starts_with("APT"));
            assert_eq!(id.len(), 9);
            assert!(taken.insert(id));
        }
    }
}
