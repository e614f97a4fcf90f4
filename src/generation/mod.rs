//! Example data and prompt generation from column declarations.
//!
//! Everything here is a pure function of the declarations plus an injected random number
//! generator; nothing touches the store. Use a seeded RNG for reproducible output:
//!
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use csv_seeder::generation::{generate_example_csv, generate_prompt};
//! use csv_seeder::types::{ColumnDeclaration, ColumnSet};
//!
//! # fn main() -> Result<(), csv_seeder::ImportError> {
//! let columns = ColumnSet::new(vec![
//!     ColumnDeclaration::new("name", "Full Name").required(),
//!     ColumnDeclaration::new("email", "Email Address").required(),
//! ])?;
//! let mut rng = StdRng::seed_from_u64(7);
//! let example = generate_example_csv(&columns, 3, &mut rng)?;
//! assert!(example.starts_with("name,email\n"));
//!
//! let prompt = generate_prompt(&columns, 3, &mut rng)?;
//! assert!(prompt.starts_with("Description of columns:\nname\n"));
//! # Ok(())
//! # }
//! ```

pub mod example;
pub mod generators;
pub mod prompt;

pub use example::{example_value, generate_example_csv, DEFAULT_EXAMPLE_ROWS};
pub use generators::ValueGenerator;
pub use prompt::{describe_columns, generate_prompt, infer_data_type};
