pub mod mock_bot;
pub mod mock_transport;
