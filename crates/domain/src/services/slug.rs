//! Slug derivation and collision handling.

use rand::distributions::Alphanumeric;
use rand::Rng;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::stores::SiteStore;
use shared::validation::MAX_SLUG_LENGTH;

/// Highest numeric suffix tried before giving up on a derived slug.
const MAX_SUFFIX: u32 = 100;

/// Joins bride and groom in a derived slug.
const COUPLE_JOINER: &str = "e";

fn fold_char(c: char) -> Option<&'static str> {
    let folded = match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => "a",
        'ç' => "c",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'ñ' => "n",
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'ø' => "o",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ß' => "ss",
        'æ' => "ae",
        'œ' => "oe",
        _ => return None,
    };
    Some(folded)
}

/// Lowercases and folds Latin accents to ASCII (`"João"` -> `"joao"`).
pub fn fold_accents(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars().flat_map(char::to_lowercase) {
        match fold_char(c) {
            Some(folded) => out.push_str(folded),
            None => out.push(c),
        }
    }
    out
}

/// Turns arbitrary text into a URL-safe slug.
///
/// Runs of anything other than ASCII letters and digits become one hyphen.
pub fn slugify(input: &str) -> String {
    fold_accents(input)
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Derives `{bride}-e-{groom}`. `None` unless both names yield a slug.
pub fn derive_slug(bride_name: &str, groom_name: &str) -> Option<String> {
    let bride = slugify(bride_name);
    let groom = slugify(groom_name);
    if bride.is_empty() || groom.is_empty() {
        return None;
    }
    Some(truncate(&format!("{}-{}-{}", bride, COUPLE_JOINER, groom), MAX_SLUG_LENGTH))
}

/// Applies the editor's keystroke normalization: lowercase, spaces to hyphens.
///
/// The result is not guaranteed valid; save-time validation decides.
pub fn normalize_slug_input(input: &str) -> String {
    input.trim().to_lowercase().replace(' ', "-")
}

/// Fallback slug for auto-saves that cannot derive one.
pub fn random_slug() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("site-{}", suffix)
}

fn truncate(slug: &str, max: usize) -> String {
    if slug.len() <= max {
        return slug.to_string();
    }
    slug[..max].trim_end_matches('-').to_string()
}

fn with_suffix(base: &str, n: u32) -> String {
    let suffix = format!("-{}", n);
    format!("{}{}", truncate(base, MAX_SLUG_LENGTH - suffix.len()), suffix)
}

/// First slug from `base`, `base-1`, `base-2`, ... that is free or already
/// held by `owner_id`.
pub async fn ensure_unique(
    store: &dyn SiteStore,
    owner_id: Uuid,
    base: &str,
) -> Result<String, StoreError> {
    let mut slug = base.to_string();
    let mut counter = 1;

    loop {
        match store.slug_owner(&slug).await? {
            None => return Ok(slug),
            Some(holder) if holder == owner_id => return Ok(slug),
            Some(_) => {}
        }
        if counter > MAX_SUFFIX {
            return Err(StoreError::Conflict(format!(
                "could not find a free slug for '{}'",
                base
            )));
        }
        slug = with_suffix(base, counter);
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteContent;
    use crate::stores::MemorySiteStore;

    #[test]
    fn test_fold_accents() {
        assert_eq!(fold_accents("João"), "joao");
        assert_eq!(fold_accents("CONCEIÇÃO"), "conceicao");
        assert_eq!(fold_accents("Zoë Straße"), "zoe strasse");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ana Maria"), "ana-maria");
        assert_eq!(slugify("  José  d'Ávila "), "jose-d-avila");
        assert_eq!(slugify("--Ana__&__Bia--"), "ana-bia");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_derive_slug() {
        assert_eq!(derive_slug("Ana", "Joao").as_deref(), Some("ana-e-joao"));
        assert_eq!(derive_slug("Ana", "João").as_deref(), Some("ana-e-joao"));
        assert_eq!(
            derive_slug("Maria Clara", "Pedro Henrique").as_deref(),
            Some("maria-clara-e-pedro-henrique")
        );
        assert_eq!(derive_slug("", "Joao"), None);
        assert_eq!(derive_slug("Ana", "   "), None);
    }

    #[test]
    fn test_derive_slug_is_valid_and_bounded() {
        let long = "a".repeat(100);
        let slug = derive_slug(&long, "Joao").unwrap();
        assert!(slug.len() <= MAX_SLUG_LENGTH);
        assert!(shared::validation::validate_slug(&slug).is_ok());
    }

    #[test]
    fn test_normalize_slug_input() {
        assert_eq!(normalize_slug_input(" Ana E Joao "), "ana-e-joao");
        assert_eq!(normalize_slug_input("AnaJoao2025"), "anajoao2025");
    }

    #[test]
    fn test_random_slug() {
        let slug = random_slug();
        assert!(slug.starts_with("site-"));
        assert_eq!(slug.len(), "site-".len() + 8);
        assert!(shared::validation::validate_slug(&slug).is_ok());
        assert_ne!(random_slug(), random_slug());
    }

    #[test]
    fn test_with_suffix_respects_max_length() {
        let base = "a".repeat(MAX_SLUG_LENGTH);
        let slug = with_suffix(&base, 12);
        assert_eq!(slug.len(), MAX_SLUG_LENGTH);
        assert!(slug.ends_with("-12"));
    }

    #[tokio::test]
    async fn test_ensure_unique() {
        let store = MemorySiteStore::new();
        let holder = Uuid::new_v4();
        let content = SiteContent {
            slug: "ana-e-joao".into(),
            ..Default::default()
        };
        store.upsert_by_owner(holder, &content).await.unwrap();

        assert_eq!(
            ensure_unique(&store, holder, "ana-e-joao").await.unwrap(),
            "ana-e-joao"
        );
        assert_eq!(
            ensure_unique(&store, Uuid::new_v4(), "ana-e-joao").await.unwrap(),
            "ana-e-joao-1"
        );
        assert_eq!(
            ensure_unique(&store, Uuid::new_v4(), "bia-e-caio").await.unwrap(),
            "bia-e-caio"
        );
    }

    #[tokio::test]
    async fn test_ensure_unique_skips_taken_suffixes() {
        let store = MemorySiteStore::new();
        for slug in ["ana-e-joao", "ana-e-joao-1"] {
            let content = SiteContent {
                slug: slug.into(),
                ..Default::default()
            };
            store.upsert_by_owner(Uuid::new_v4(), &content).await.unwrap();
        }

        assert_eq!(
            ensure_unique(&store, Uuid::new_v4(), "ana-e-joao").await.unwrap(),
            "ana-e-joao-2"
        );
    }
}
