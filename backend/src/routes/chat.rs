pub const GET_CHAT: &str = "/chat/{buyer_id}/{farm_id}";
pub const POST_CHAT_MESSAGE: &str = "/chat/{buyer_id}/{farm_id}/message";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_values() {
        assert!(POST_CHAT_MESSAGE.starts_with(GET_CHAT));
        assert!(POST_CHAT_MESSAGE.ends_with("/message"));
    }
}
