pub mod ytm;
