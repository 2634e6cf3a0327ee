//! Synthetic record generation.
//!
//! Each worker owns its own generator instance: the generator keeps mutable
//! RNG state and is deliberately not shared between tasks.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// A single synthetic user record. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Contact address
    pub email: String,
    /// Physical address
    pub address: String,
}

/// Produces one record of fixed shape on demand.
///
/// Implementations are stateless across calls but not assumed thread-safe;
/// each worker must use its own instance.
pub trait RecordGenerator {
    /// Generates the next record.
    fn generate(&mut self) -> Record;
}

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Carlos", "Karen", "Daniel", "Nancy", "Matthew", "Lisa", "Anthony", "Betty", "Mark", "Sandra",
    "Lucia", "Ashley",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Sanchez",
    "Clark", "Ramirez", "Lewis", "Walker",
];

const STREET_NAMES: &[&str] = &[
    "Maple Street", "Oak Avenue", "Cedar Lane", "Elm Drive", "Pine Road", "Washington Boulevard",
    "Lake View Terrace", "Hillcrest Avenue", "River Road", "Sunset Drive", "Park Place",
    "Church Street", "Highland Avenue", "Willow Way", "Meadow Lane", "Franklin Street",
];

const CITIES: &[&str] = &[
    "Springfield", "Riverside", "Fairview", "Franklin", "Greenville", "Bristol", "Clinton",
    "Madison", "Georgetown", "Salem", "Arlington", "Ashland", "Burlington", "Manchester",
    "Milton", "Newport",
];

const STATES: &[&str] = &[
    "AL", "CA", "CO", "FL", "GA", "IL", "MA", "MI", "NC", "NJ", "NY", "OH", "OR", "PA", "TX", "WA",
];

const EMAIL_DOMAINS: &[&str] = &[
    "example.com",
    "example.org",
    "mail.example.net",
    "inbox.example.io",
];

/// Rand-backed record generator with built-in name and street word lists.
///
/// Emails are derived from the sampled names plus a random suffix so generated
/// addresses look plausible without being unique in any guaranteed sense.
#[derive(Debug)]
pub struct FakeRecordGenerator {
    rng: SmallRng,
}

impl FakeRecordGenerator {
    /// Creates a generator seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    /// Creates a generator with a fixed seed, for reproducible output.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.random_range(0..values.len())]
    }
}

impl Default for FakeRecordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordGenerator for FakeRecordGenerator {
    fn generate(&mut self) -> Record {
        let first_name = self.pick(FIRST_NAMES).to_string();
        let last_name = self.pick(LAST_NAMES).to_string();
        let email = format!(
            "{}.{}{}@{}",
            first_name.to_lowercase(),
            last_name.to_lowercase(),
            self.rng.random_range(1..10_000u32),
            self.pick(EMAIL_DOMAINS),
        );
        let address = format!(
            "{} {} {} {}",
            self.rng.random_range(1..10_000u32),
            self.pick(STREET_NAMES),
            self.pick(CITIES),
            self.pick(STATES),
        );
        Record {
            first_name,
            last_name,
            email,
            address,
        }
    }
}
