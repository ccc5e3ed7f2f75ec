pub mod parcel;
pub mod simulate;
pub mod sweep;
