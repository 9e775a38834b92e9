pub mod asset_index;

pub use asset_index::{
    parse_asset_index, AssetIndex, AssetLayout, AssetObject, PendingObject, RESOURCES_URL,
};
