use crate::Generator;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snaplink_core::shortcode::{MAX_LENGTH, MIN_LENGTH};
use snaplink_core::ShortCode;
use thiserror::Error;
use typed_builder::TypedBuilder;

/// The 64 URL-safe symbols: `A-Z`, `a-z`, `0-9`, `_` and `-`.
pub const URL_SAFE_ALPHABET: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

pub const DEFAULT_LENGTH: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("alphabet needs at least 2 symbols, got {0}")]
    AlphabetTooSmall(usize),
    #[error("alphabet symbol '{0}' is repeated")]
    DuplicateSymbol(char),
    #[error("alphabet symbol '{0}' is not URL-safe")]
    InvalidSymbol(char),
    #[error("code length must be between 3 and 32, got {0}")]
    InvalidLength(usize),
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct GeneratorSettings {
    #[builder(default = URL_SAFE_ALPHABET.to_string(), setter(into))]
    alphabet: String,
    #[builder(default = DEFAULT_LENGTH)]
    length: usize,
    /// Fixes the random sequence. Meant for tests.
    #[builder(default, setter(strip_option))]
    seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
enum RngSource {
    Thread,
    Seeded(Mutex<StdRng>),
}

/// Draws fixed-length codes uniformly at random from a fixed alphabet.
///
/// With the default settings (7 symbols from a 64-symbol alphabet) the
/// namespace holds 2^42 codes, so collisions with existing mappings are rare
/// but possible.
#[derive(Debug)]
pub struct AlphabetGenerator {
    symbols: Vec<char>,
    length: usize,
    rng: RngSource,
}

impl AlphabetGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self, GeneratorError> {
        let mut symbols: Vec<char> = Vec::with_capacity(settings.alphabet.len());
        for c in settings.alphabet.chars() {
            if !ShortCode::is_valid_char(c) {
                return Err(GeneratorError::InvalidSymbol(c));
            }
            if symbols.contains(&c) {
                return Err(GeneratorError::DuplicateSymbol(c));
            }
            symbols.push(c);
        }
        if symbols.len() < 2 {
            return Err(GeneratorError::AlphabetTooSmall(symbols.len()));
        }
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&settings.length) {
            return Err(GeneratorError::InvalidLength(settings.length));
        }

        let rng = match settings.seed {
            Some(seed) => RngSource::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
            None => RngSource::Thread,
        };

        Ok(Self {
            symbols,
            length: settings.length,
            rng,
        })
    }

    /// Seven symbols from [`URL_SAFE_ALPHABET`], drawn from the thread RNG.
    pub fn url_safe() -> Self {
        Self {
            symbols: URL_SAFE_ALPHABET.chars().collect(),
            length: DEFAULT_LENGTH,
            rng: RngSource::Thread,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of distinct codes this generator can produce, if it fits in a `u128`.
    pub fn namespace_size(&self) -> Option<u128> {
        let base = self.symbols.len() as u128;
        (0..self.length).try_fold(1u128, |acc, _| acc.checked_mul(base))
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.length)
            .map(|_| self.symbols[rng.gen_range(0..self.symbols.len())])
            .collect()
    }
}

impl Default for AlphabetGenerator {
    fn default() -> Self {
        Self::url_safe()
    }
}

impl Generator for AlphabetGenerator {
    fn generate(&self) -> ShortCode {
        let candidate = match &self.rng {
            RngSource::Thread => self.draw(&mut rand::thread_rng()),
            RngSource::Seeded(rng) => self.draw(&mut *rng.lock()),
        };
        // Alphabet and length are validated at construction.
        ShortCode::new_unchecked(candidate)
    }
}
