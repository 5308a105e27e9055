use anyhow::{Context, Result, bail};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse CLI seed tokens. Accepts decimal and `0x`-prefixed hexadecimal.
pub fn parse_seeds(tokens: &[String]) -> Result<Vec<u64>> {
    if tokens.is_empty() {
        bail!("at least one seed is required");
    }
    tokens
        .iter()
        .map(|token| {
            let parsed = match token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
            {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => token.parse::<u64>(),
            };
            parsed.with_context(|| format!("invalid seed {token:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_trims_and_skips_blanks() {
        assert_eq!(split_csv(" smoke, ,exhausted,"), vec!["smoke", "exhausted"]);
    }

    #[test]
    fn seeds_accept_decimal_and_hex() {
        let tokens = split_csv("1337,0xFF,0X10");
        assert_eq!(parse_seeds(&tokens).unwrap(), vec![1337, 255, 16]);
    }

    #[test]
    fn bad_seeds_are_rejected() {
        assert!(parse_seeds(&split_csv("12,abc")).is_err());
        assert!(parse_seeds(&[]).is_err());
    }
}
