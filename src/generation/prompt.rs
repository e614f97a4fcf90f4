//! Natural-language data generation prompt.

use rand::Rng;

use crate::error::ImportResult;
use crate::types::{ColumnDeclaration, ColumnSet};

use super::example::generate_example_csv;

const INSTRUCTIONS: &str =
    "Given the described data above, generate 10 rows of csv data into a copyable text block.";

/// Data type label shown for a column in the prompt.
pub fn infer_data_type(col: &ColumnDeclaration) -> String {
    if !col.value_options.is_empty() {
        let values: Vec<String> = col.value_options.iter().map(|o| o.as_literal()).collect();
        return format!("one of [{}]", values.join(", "));
    }
    let label = match col.key.to_ascii_lowercase().as_str() {
        "id" => "uuid or string",
        "email" => "email address",
        "name" | "fullname" => "person name",
        "phone" => "phone number",
        "date" | "created_at" | "updated_at" | "timestamp" => "date/time",
        "price" | "amount" | "cost" => "decimal number",
        "count" | "quantity" | "age" => "integer",
        _ => "string",
    };
    label.to_string()
}

/// The column description section of the prompt.
///
/// Depends only on the declarations, so repeated calls return identical text.
pub fn describe_columns(columns: &ColumnSet) -> String {
    if columns.is_empty() {
        return String::new();
    }
    let mut out = String::from("Description of columns:\n");
    for col in columns.iter() {
        out.push_str(&format!("{}\n", col.key));
        out.push_str(&format!("description: {}\n", col.description_or_label()));
        out.push_str(&format!("data_type: {}\n", infer_data_type(col)));
        out.push_str(&format!("required: {}\n\n", col.required));
    }
    out
}

/// Column descriptions, an example CSV of `rows` lines, and instructions asking for more rows.
///
/// Returns an empty string for an empty column set.
pub fn generate_prompt<R: Rng>(
    columns: &ColumnSet,
    rows: usize,
    rng: &mut R,
) -> ImportResult<String> {
    if columns.is_empty() {
        return Ok(String::new());
    }
    let mut prompt = describe_columns(columns);
    prompt.push_str("\nExample csv:\n");
    prompt.push_str(&generate_example_csv(columns, rows, rng)?);
    prompt.push_str("\n\nInstructions:\n");
    prompt.push_str(INSTRUCTIONS);
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::{describe_columns, generate_prompt, infer_data_type};
    use crate::types::{ColumnDeclaration, ColumnSet, ValueOption};

    #[test]
    fn data_types_follow_options_then_key_names() {
        let opts = ColumnDeclaration::new("difficulty", "Difficulty").with_options(vec![
            ValueOption::new("easy", "Beginner"),
            ValueOption::new("hard", "Advanced"),
        ]);
        assert_eq!(infer_data_type(&opts), r#"one of ["easy", "hard"]"#);

        let numeric = ColumnDeclaration::new("role_id", "Role")
            .with_options(vec![ValueOption::new(1, "Admin"), ValueOption::new(2, "Editor")]);
        assert_eq!(infer_data_type(&numeric), "one of [1, 2]");

        let cases = [
            ("id", "uuid or string"),
            ("Email", "email address"),
            ("fullname", "person name"),
            ("phone", "phone number"),
            ("created_at", "date/time"),
            ("price", "decimal number"),
            ("age", "integer"),
            ("front", "string"),
        ];
        for (key, expected) in cases {
            assert_eq!(infer_data_type(&ColumnDeclaration::new(key, key)), expected, "{key}");
        }
    }

    #[test]
    fn description_falls_back_to_label() {
        let cols = ColumnSet::new(vec![
            ColumnDeclaration::new("name", "Full Name").required(),
            ColumnDeclaration::new("email", "Email Address").with_description("Must be unique"),
        ])
        .unwrap();
        let text = describe_columns(&cols);
        assert_eq!(
            text,
            "Description of columns:\n\
             name\ndescription: Full Name\ndata_type: person name\nrequired: true\n\n\
             email\ndescription: Must be unique\ndata_type: email address\nrequired: false\n\n"
        );
    }

    #[test]
    fn prompt_layout_and_stable_description_section() {
        let cols = ColumnSet::new(vec![
            ColumnDeclaration::new("name", "Name").required(),
            ColumnDeclaration::new("city", "City"),
        ])
        .unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let first = generate_prompt(&cols, 3, &mut rng).unwrap();
        let second = generate_prompt(&cols, 3, &mut rng).unwrap();

        let section = describe_columns(&cols);
        assert!(first.starts_with(&section));
        assert!(second.starts_with(&section));
        assert!(first.contains("\nExample csv:\nname,city\n"));
        assert!(first.ends_with(
            "\n\nInstructions:\nGiven the described data above, generate 10 rows of csv data into a copyable text block."
        ));
    }

    #[test]
    fn empty_columns_give_empty_prompt() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(generate_prompt(&ColumnSet::empty(), 3, &mut rng).unwrap(), "");
    }
}
