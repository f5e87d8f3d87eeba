//! Shared string utilities for code generation.

/// Convert a string to snake_case (e.g., "HelloWorld" -> "hello_world")
///
/// Runs of capitals are kept together, so "GetInfoRPC" becomes "get_info_rpc".
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower)
            {
                result.push('_');
            }
        }
        if c == '-' || c == '.' {
            result.push('_');
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

/// Convert a string to an upper-case macro name (e.g., "uavcan.node" -> "UAVCAN_NODE")
pub fn macrofy(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("Hello"), "hello");
        assert_eq!(to_snake_case("HelloWorld"), "hello_world");
        assert_eq!(to_snake_case("GetInfoRPC"), "get_info_rpc");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("Value16"), "value16");
        assert_eq!(to_snake_case("hello-world"), "hello_world");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn test_macrofy() {
        assert_eq!(macrofy("uavcan.node.Heartbeat"), "UAVCAN_NODE_HEARTBEAT");
        assert_eq!(macrofy("Health"), "HEALTH");
    }
}
