pub mod advisor;
pub mod buyers;
pub mod chat;
pub mod crops;
pub mod farms;
pub mod system;
pub mod weather;

#[cfg(test)]
mod tests {
    #[test]
    fn test_module_structure() {
        assert_eq!(super::system::HEALTH, "/health");
        assert_eq!(super::farms::LIST_FARMS, "/farms");
        assert_eq!(super::crops::LIST_CROPS, "/crops");
        assert_eq!(super::buyers::LIST_BUYERS, "/buyers");
        assert_eq!(
            super::chat::GET_CHAT,
            "/chat/{buyer_id}/{farm_id}"
        );
        assert_eq!(super::weather::GET_WEATHER, "/weather/{lat}/{lng}");
        assert_eq!(super::advisor::PREDICT_YIELD, "/ai/predict-yield");
        assert_eq!(
            super::advisor::RECOMMEND_CROPS,
            "/ai/crop-recommendation"
        );
    }
}
