//! CDS instruments: input model, IMM coupon schedules and pricing.

pub mod asset;
pub mod pricer;

pub use asset::{
    generate_coupons, input_to_assets, load_cds_inputs, CdsAsset, CdsInput, FixedCoupon, DEFAULT_MIN_TENOR_YEARS,
};
pub use pricer::CdsPricer;
