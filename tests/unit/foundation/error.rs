use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TextreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TextreelError::unsupported_encoding("x")
            .to_string()
            .contains("unsupported encoding:")
    );
    assert!(
        TextreelError::invalid_state("x")
            .to_string()
            .contains("invalid state transition:")
    );
    assert!(TextreelError::render("x").to_string().contains("render error:"));
    assert!(TextreelError::encode("x").to_string().contains("encode error:"));
    assert!(TextreelError::export("x").to_string().contains("export error:"));
    assert!(
        TextreelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TextreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
