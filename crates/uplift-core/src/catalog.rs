//! The message catalog and category resolution.
//!
//! The catalog is a fixed, deploy-time mapping from category name to an
//! ordered list of candidate messages. Resolution picks the effective
//! category from the request, the subscriber's stored preference, and the
//! fallback rules, then draws one message uniformly at random from that
//! category's list.

use std::collections::BTreeMap;

use rand::{Rng, seq::SliceRandom as _};

use crate::{Error, Result};

/// Category used when no preference is available or the resolved name is
/// unknown.
pub const FALLBACK_CATEGORY: &str = "motivation";

/// The outcome of category resolution: the effective category name and the
/// message drawn from its list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
  pub category: String,
  pub message:  String,
}

/// An immutable named mapping of message categories.
#[derive(Debug, Clone)]
pub struct Catalog {
  categories: BTreeMap<String, Vec<String>>,
}

impl Catalog {
  pub fn new(categories: BTreeMap<String, Vec<String>>) -> Self {
    Self { categories }
  }

  /// The catalog shipped with the service: three categories of uplifting
  /// messages and mental health tips.
  pub fn builtin() -> Self {
    let mut categories = BTreeMap::new();
    categories.insert(
      "motivation".to_string(),
      vec![
        "You are capable of amazing things. Keep going!".to_string(),
        "Small steps forward are still progress. Celebrate them!".to_string(),
        "Today is a new opportunity to create positive change.".to_string(),
        "You've overcome difficult things before, and you can do it again."
          .to_string(),
        "Progress isn't always visible, but that doesn't mean it's not happening."
          .to_string(),
        "Be proud of yourself for making it this far.".to_string(),
        "You are stronger than you think and braver than you believe."
          .to_string(),
        "Don't forget to celebrate your small victories today.".to_string(),
        "Your best is enough, and it will always be enough.".to_string(),
      ],
    );
    categories.insert(
      "mental_health".to_string(),
      vec![
        "Your mental health matters. Be kind to yourself today.".to_string(),
        "It's okay to ask for help when you need it.".to_string(),
        "You don't have to be perfect to be worthy of love and respect."
          .to_string(),
        "Your feelings are valid, but they don't define you.".to_string(),
        "Self-care isn't selfish, it's necessary.".to_string(),
        "Your worth isn't measured by your productivity.".to_string(),
        "It's okay to set boundaries that protect your peace.".to_string(),
        "Healing isn't linear, and that's perfectly normal.".to_string(),
        "You matter, even on the days when you don't feel like you do."
          .to_string(),
      ],
    );
    categories.insert(
      "mindfulness".to_string(),
      vec![
        "Take a moment to breathe deeply and appreciate this moment."
          .to_string(),
        "Remember to drink water and take short breaks throughout your day."
          .to_string(),
        "Notice one small thing around you and give it your full attention."
          .to_string(),
        "A single slow breath can reset the shape of your whole afternoon."
          .to_string(),
      ],
    );
    Self { categories }
  }

  pub fn category_names(&self) -> impl Iterator<Item = &str> {
    self.categories.keys().map(String::as_str)
  }

  pub fn contains(&self, name: &str) -> bool {
    self.non_empty(name).is_some()
  }

  pub fn messages(&self, name: &str) -> Option<&[String]> {
    self.categories.get(name).map(Vec::as_slice)
  }

  /// A category's list, treating an empty list the same as a missing key.
  fn non_empty(&self, name: &str) -> Option<&[String]> {
    self
      .categories
      .get(name)
      .filter(|list| !list.is_empty())
      .map(Vec::as_slice)
  }

  /// Resolve the effective category and draw one message from its list.
  ///
  /// Precedence: a request-supplied category wins (verbatim, even if it is
  /// not a catalog key), then the subscriber's stored preference, then
  /// [`FALLBACK_CATEGORY`]. An unrecognised name falls back to the
  /// fallback category's list; if that list is itself missing, a catalog
  /// key is chosen uniformly at random and reported as the effective
  /// category. A catalog with no usable categories is an error.
  ///
  /// Message selection is a uniform draw: no weighting, no
  /// repetition-avoidance, independent across calls.
  pub fn resolve<R: Rng + ?Sized>(
    &self,
    requested: Option<&str>,
    preference: Option<&str>,
    rng: &mut R,
  ) -> Result<Resolution> {
    let named = requested.or(preference).unwrap_or(FALLBACK_CATEGORY);

    let (category, list) = match self.non_empty(named) {
      Some(list) => (named, list),
      None => match self.non_empty(FALLBACK_CATEGORY) {
        Some(list) => (FALLBACK_CATEGORY, list),
        None => return self.random(rng),
      },
    };

    Ok(Resolution {
      category: category.to_string(),
      message:  Self::draw(list, rng)?,
    })
  }

  /// Draw from a category chosen uniformly at random. Used for the
  /// broadcast-topic fallback and as the last resort of [`resolve`].
  ///
  /// [`resolve`]: Catalog::resolve
  pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Resolution> {
    let usable: Vec<(&str, &[String])> = self
      .categories
      .iter()
      .filter(|(_, list)| !list.is_empty())
      .map(|(name, list)| (name.as_str(), list.as_slice()))
      .collect();

    let (category, list) =
      usable.choose(rng).copied().ok_or(Error::EmptyCatalog)?;

    Ok(Resolution {
      category: category.to_string(),
      message:  Self::draw(list, rng)?,
    })
  }

  fn draw<R: Rng + ?Sized>(list: &[String], rng: &mut R) -> Result<String> {
    list.choose(rng).cloned().ok_or(Error::EmptyCatalog)
  }
}

impl Default for Catalog {
  fn default() -> Self {
    Self::builtin()
  }
}
