//! Prompt construction helpers.

/// Label under which table definitions are referenced in prompts.
pub const TABLE_DEFINITIONS_CAP_REF: &str = "TABLE_DEFINITIONS";

/// Instructions given to the SQL assistant.
pub const SQL_ANALYST_INSTRUCTIONS: &str = "You're an elite SQL developer. You generate the most concise and performant SQL queries. Do not include a semicolon at the end of the SQL statement.";

/// Follow-up asking the model to execute the SQL it produced.
pub const RUN_SQL_FOLLOW_UP: &str = "Use the run_sql function to run the SQL you've just generated.";

/// Appends a labelled block of reference content to `prompt`.
///
/// `suffix` tells the model how to use the block; `cap_ref` is the label it
/// is referred to by.
pub fn add_cap_ref(prompt: &str, suffix: &str, cap_ref: &str, content: &str) -> String {
    format!("{}\n\n{}\n\n{}\n\n{}", prompt, suffix, cap_ref, content)
}

/// Builds the opening prompt for `query` with the given table definitions.
pub fn database_query_prompt(query: &str, table_definitions: &str) -> String {
    add_cap_ref(
        &format!("Fulfill this database query: {}. ", query),
        &format!(
            "Use these {} to satisfy the database query.",
            TABLE_DEFINITIONS_CAP_REF
        ),
        TABLE_DEFINITIONS_CAP_REF,
        table_definitions,
    )
}
