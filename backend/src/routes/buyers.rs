pub const LIST_BUYERS: &str = "/buyers";
pub const GET_BUYER: &str = "/buyers/{id}";
pub const POST_PURCHASE: &str = "/buyers/{id}/purchase";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_values() {
        assert_eq!(LIST_BUYERS, "/buyers");
        assert!(POST_PURCHASE.starts_with(GET_BUYER));
    }
}
