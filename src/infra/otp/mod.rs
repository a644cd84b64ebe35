mod client;

pub use client::{OtpClient, PlanCoord, PlanOutcome, PlanRequest, ValidPlanRequest};
