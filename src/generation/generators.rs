//! Named value generators for example data.

use std::fmt;
use std::str::FromStr;

use chrono::{SecondsFormat, TimeDelta, Utc};
use rand::Rng;

use crate::error::ImportError;

/// A generator for one kind of synthetic value.
///
/// Declarations refer to generators by dotted hint (`"commerce.productName"`); hints are
/// resolved through [`FromStr`] when the declaration is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueGenerator {
    ProductName,
    ProductDescription,
    Department,
    ProductAdjective,
    Sentence,
    Paragraph,
    FullName,
    Email,
    PhoneNumber,
    StreetAddress,
    City,
    Country,
    RecentDate,
    Uuid,
}

const ALL: [ValueGenerator; 14] = [
    ValueGenerator::ProductName,
    ValueGenerator::ProductDescription,
    ValueGenerator::Department,
    ValueGenerator::ProductAdjective,
    ValueGenerator::Sentence,
    ValueGenerator::Paragraph,
    ValueGenerator::FullName,
    ValueGenerator::Email,
    ValueGenerator::PhoneNumber,
    ValueGenerator::StreetAddress,
    ValueGenerator::City,
    ValueGenerator::Country,
    ValueGenerator::RecentDate,
    ValueGenerator::Uuid,
];

const FIRST_NAMES: &[&str] = &[
    "Ada", "Grace", "Alan", "Edsger", "Barbara", "Donald", "Frances", "Ken", "Margaret", "Niklaus",
    "Radia", "Tim",
];
const LAST_NAMES: &[&str] = &[
    "Lovelace", "Hopper", "Turing", "Dijkstra", "Liskov", "Knuth", "Allen", "Thompson", "Hamilton",
    "Wirth", "Perlman", "Berners-Lee",
];
const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "mail.test", "inbox.test"];
const ADJECTIVES: &[&str] = &[
    "Ergonomic", "Handcrafted", "Sleek", "Rustic", "Refined", "Practical", "Compact", "Durable",
    "Generic", "Luxurious",
];
const MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Cotton", "Granite", "Plastic", "Bamboo", "Ceramic", "Leather",
];
const PRODUCTS: &[&str] = &[
    "Chair", "Lamp", "Keyboard", "Backpack", "Kettle", "Bicycle", "Notebook", "Table", "Jacket",
    "Speaker",
];
const DEPARTMENTS: &[&str] = &[
    "Electronics", "Clothing", "Books", "Home", "Garden", "Sports", "Toys", "Grocery", "Beauty",
    "Automotive",
];
const WORDS: &[&str] = &[
    "lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit", "sed", "do",
    "eiusmod", "tempor", "incididunt", "ut", "labore", "et", "dolore", "magna", "aliqua",
];
const STREETS: &[&str] = &[
    "Main Street", "Oak Avenue", "Maple Drive", "Cedar Lane", "Elm Road", "Park Place",
    "Hill Street", "Lake View",
];
const CITIES: &[&str] = &[
    "Springfield", "Riverton", "Lakeside", "Fairview", "Georgetown", "Kingston", "Ashford",
    "Milton",
];
const COUNTRIES: &[&str] = &[
    "Portugal", "Canada", "Japan", "Kenya", "Chile", "Norway", "India", "New Zealand",
];

impl ValueGenerator {
    /// The dotted hint naming this generator.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::ProductName => "commerce.productName",
            Self::ProductDescription => "commerce.productDescription",
            Self::Department => "commerce.department",
            Self::ProductAdjective => "commerce.productAdjective",
            Self::Sentence => "lorem.sentence",
            Self::Paragraph => "lorem.paragraph",
            Self::FullName => "person.fullName",
            Self::Email => "internet.email",
            Self::PhoneNumber => "phone.number",
            Self::StreetAddress => "location.streetAddress",
            Self::City => "location.city",
            Self::Country => "location.country",
            Self::RecentDate => "date.recent",
            Self::Uuid => "string.uuid",
        }
    }

    /// Generator implied by a well-known column key, if any.
    pub fn for_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "name" | "fullname" => Some(Self::FullName),
            "email" => Some(Self::Email),
            "phone" => Some(Self::PhoneNumber),
            "address" => Some(Self::StreetAddress),
            "city" => Some(Self::City),
            "country" => Some(Self::Country),
            "description" | "text" => Some(Self::Sentence),
            "id" => Some(Self::Uuid),
            _ => None,
        }
    }

    /// Produce one value.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> String {
        match self {
            Self::ProductName => format!(
                "{} {} {}",
                pick(rng, ADJECTIVES),
                pick(rng, MATERIALS),
                pick(rng, PRODUCTS)
            ),
            Self::ProductDescription => format!(
                "The {} {} {} is built for everyday use and {}.",
                pick(rng, ADJECTIVES).to_lowercase(),
                pick(rng, MATERIALS).to_lowercase(),
                pick(rng, PRODUCTS).to_lowercase(),
                sentence_body(rng, 5)
            ),
            Self::Department => pick(rng, DEPARTMENTS).to_string(),
            Self::ProductAdjective => pick(rng, ADJECTIVES).to_string(),
            Self::Sentence => sentence(rng),
            Self::Paragraph => {
                let n = rng.random_range(3..=5);
                (0..n).map(|_| sentence(rng)).collect::<Vec<_>>().join(" ")
            }
            Self::FullName => format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
            Self::Email => format!(
                "{}.{}{}@{}",
                pick(rng, FIRST_NAMES).to_lowercase(),
                pick(rng, LAST_NAMES).to_lowercase(),
                rng.random_range(1..100),
                pick(rng, EMAIL_DOMAINS)
            ),
            Self::PhoneNumber => format!(
                "({:03}) {:03}-{:04}",
                rng.random_range(200..1000),
                rng.random_range(200..1000),
                rng.random_range(0..10_000)
            ),
            Self::StreetAddress => {
                format!("{} {}", rng.random_range(1..2_000), pick(rng, STREETS))
            }
            Self::City => pick(rng, CITIES).to_string(),
            Self::Country => pick(rng, COUNTRIES).to_string(),
            Self::RecentDate => {
                let back = TimeDelta::seconds(rng.random_range(0..7 * 24 * 60 * 60));
                (Utc::now() - back).to_rfc3339_opts(SecondsFormat::Secs, true)
            }
            Self::Uuid => uuid::Builder::from_random_bytes(rng.random())
                .into_uuid()
                .to_string(),
        }
    }
}

impl FromStr for ValueGenerator {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL.iter()
            .copied()
            .find(|g| g.hint() == s)
            .ok_or_else(|| ImportError::InvalidDeclaration {
                message: format!("unknown generator hint '{s}'"),
            })
    }
}

impl fmt::Display for ValueGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.hint())
    }
}

fn pick<'a, R: Rng>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items[rng.random_range(0..items.len())]
}

fn sentence_body<R: Rng>(rng: &mut R, words: usize) -> String {
    (0..words)
        .map(|_| pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ")
}

fn sentence<R: Rng>(rng: &mut R) -> String {
    let words = rng.random_range(4..=9);
    let body = sentence_body(rng, words);
    let mut chars = body.chars();
    match chars.next() {
        Some(first) => format!("{}{}.", first.to_ascii_uppercase(), chars.as_str()),
        None => String::new(),
    }
}
