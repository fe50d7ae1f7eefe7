pub mod octagon_api;
