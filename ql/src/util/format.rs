use num_format::{CustomFormat, Grouping, ToFormattedString};

/// Digit grouping with `_`, as in Rust literals: `1_000_000`
pub fn number_format() -> CustomFormat {
    CustomFormat::builder()
        .grouping(Grouping::Standard)
        .minus_sign("-")
        .separator("_")
        .build()
        .expect("static number format should be valid")
}

pub fn grouped<N: ToFormattedString>(n: N) -> String {
    n.to_formatted_string(&number_format())
}
