pub mod blueprint;
pub mod machine;
pub mod machine_record;
