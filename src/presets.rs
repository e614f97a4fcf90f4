//! Built-in column declaration sets for the supported import pages.

use crate::generation::ValueGenerator;
use crate::types::{ColumnDeclaration, ColumnSet, ValueOption};

/// Items: owned by the acting user, typed through `type_id`.
pub fn item_columns() -> ColumnSet {
    ColumnSet::from_known(vec![
        ColumnDeclaration::new("name", "Item Name")
            .with_description("The name of the item")
            .required()
            .with_generator(ValueGenerator::ProductName),
        ColumnDeclaration::new("description", "Description")
            .with_description("A brief description of the item")
            .with_generator(ValueGenerator::ProductDescription),
        ColumnDeclaration::new("type_id", "Type ID")
            .with_description("Foreign key to the types table")
            .required()
            .with_options(vec![
                ValueOption::new(1, "Electronics"),
                ValueOption::new(2, "Clothing"),
                ValueOption::new(3, "Books"),
                ValueOption::new(4, "Home Goods"),
                ValueOption::new(5, "Sports Equipment"),
            ]),
    ])
}

/// Item types.
pub fn type_columns() -> ColumnSet {
    ColumnSet::from_known(vec![
        ColumnDeclaration::new("name", "Type Name")
            .with_description("The name of the item type")
            .required()
            .with_generator(ValueGenerator::Department),
        ColumnDeclaration::new("description", "Description")
            .with_description("A brief description of the item type")
            .with_generator(ValueGenerator::ProductAdjective),
    ])
}

/// Flashcards (demo set, no backing table).
pub fn flashcard_columns() -> ColumnSet {
    ColumnSet::from_known(vec![
        ColumnDeclaration::new("front", "Front Side")
            .with_description("The question or prompt shown to the user")
            .required()
            .with_generator(ValueGenerator::Sentence),
        ColumnDeclaration::new("back", "Back Side")
            .with_description("The answer or content revealed after flipping")
            .required()
            .with_generator(ValueGenerator::Paragraph),
        ColumnDeclaration::new("category_id", "Category")
            .with_description("Foreign key to the categories table")
            .with_options(vec![
                ValueOption::new(1, "Programming"),
                ValueOption::new(2, "Mathematics"),
                ValueOption::new(3, "Science"),
                ValueOption::new(4, "Languages"),
                ValueOption::new(5, "History"),
            ]),
        ColumnDeclaration::new("difficulty", "Difficulty")
            .with_description("Difficulty level of the flashcard")
            .with_options(vec![
                ValueOption::new("easy", "Beginner level"),
                ValueOption::new("medium", "Intermediate level"),
                ValueOption::new("hard", "Advanced level"),
            ]),
    ])
}

/// Users. `role_id` and `status` are accepted but not stored.
pub fn user_columns() -> ColumnSet {
    ColumnSet::from_known(vec![
        ColumnDeclaration::new("name", "Full Name")
            .required()
            .with_generator(ValueGenerator::FullName),
        ColumnDeclaration::new("email", "Email Address")
            .with_description("Must be unique")
            .required()
            .with_generator(ValueGenerator::Email),
        ColumnDeclaration::new("role_id", "User Role")
            .with_description("Foreign key to the roles table")
            .required()
            .with_options(vec![
                ValueOption::new(1, "Admin - Full system access"),
                ValueOption::new(2, "Editor - Can edit content"),
                ValueOption::new(3, "User - Basic access"),
                ValueOption::new(4, "Guest - Limited access"),
            ]),
        ColumnDeclaration::new("status", "Account Status")
            .with_description("Current status of the user account")
            .required()
            .with_options(vec![
                ValueOption::new("active", "Account is active"),
                ValueOption::new("inactive", "Account is temporarily disabled"),
                ValueOption::new("pending", "Account awaiting verification"),
                ValueOption::new("banned", "Account permanently disabled"),
            ]),
    ])
}
