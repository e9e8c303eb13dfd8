//! Naming rules for machines, NICs, shared disks and file shares.

pub mod validation;

pub use validation::{
    MAX_MACHINE_NAME_LEN, MAX_PUBLIC_IP_NAME_LEN, MAX_SHARED_DISK_ID_LEN, machine_name_problem,
    public_ip_name, share_name_problem, shared_disk_id_problem,
};
