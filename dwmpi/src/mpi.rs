use crate::Reducer;
use libc::{c_char, c_int, c_void};
use std::ptr;

// MPICH handle values

type MpiComm = c_int;
type MpiDatatype = c_int;
type MpiOp = c_int;

const MPI_MAX: MpiOp = 0x58000001;
const MPI_MIN: MpiOp = 0x58000002;
const MPI_SUM: MpiOp = 0x58000003;

const MPI_COMM_WORLD: MpiComm = 0x44000000;

const MPI_DOUBLE: MpiDatatype = 0x4c00080b;

const MPI_SUCCESS: c_int = 0;

#[link(name = "mpich", kind = "dylib")]
extern "C" {
    fn MPI_Init(argc: *const c_int, argv: *const c_char) -> c_int;

    fn MPI_Initialized(flag: *mut c_int) -> c_int;

    fn MPI_Finalize() -> c_int;

    fn MPI_Comm_rank(comm: MpiComm, rank: *mut c_int) -> c_int;

    fn MPI_Comm_size(comm: MpiComm, size: *mut c_int) -> c_int;

    fn MPI_Allreduce(
        sendbuf: *const c_void,
        recvbuf: *mut c_void,
        count: c_int,
        datatype: MpiDatatype,
        op: MpiOp,
        comm: MpiComm,
    ) -> c_int;
}

/// Initialises MPI unless that already happened. Panics if MPI reports an
/// error.
pub fn init() {
    let mut flag: c_int = 0;

    check(unsafe { MPI_Initialized(&mut flag) }, "MPI_Initialized");

    if flag != 0 {
        return;
    }

    check(unsafe { MPI_Init(ptr::null(), ptr::null()) }, "MPI_Init");
}

pub fn finalize() -> i32 {
    unsafe { MPI_Finalize() }
}

pub fn get_comm_world_rank() -> i32 {
    let mut rank = 0;
    unsafe { MPI_Comm_rank(MPI_COMM_WORLD, &mut rank) };
    rank
}

pub fn get_comm_world_size() -> i32 {
    let mut size = 0;
    unsafe { MPI_Comm_size(MPI_COMM_WORLD, &mut size) };
    size
}

/// Reducer over `MPI_COMM_WORLD`. MPI must be initialised with [`init`]
/// before the first collective.
pub struct MpiReducer {
    rank: usize,
    size: usize,
}

impl MpiReducer {
    pub fn new() -> MpiReducer {
        init();

        MpiReducer {
            rank: get_comm_world_rank() as usize,
            size: get_comm_world_size() as usize,
        }
    }

    fn all_reduce(&self, local: f64, op: MpiOp) -> f64 {
        let mut global = 0.0f64;

        let rc = unsafe {
            MPI_Allreduce(
                &local as *const f64 as *const c_void,
                &mut global as *mut f64 as *mut c_void,
                1,
                MPI_DOUBLE,
                op,
                MPI_COMM_WORLD,
            )
        };

        check(rc, "MPI_Allreduce");

        global
    }
}

// a failed collective leaves the ranks without a common value; no rank may
// carry on with the receive buffer
fn check(rc: c_int, call: &str) {
    if rc != MPI_SUCCESS {
        log::error!("{} returned error code {}", call, rc);
        panic!("{} returned error code {}", call, rc);
    }
}

impl Default for MpiReducer {
    fn default() -> Self {
        MpiReducer::new()
    }
}

impl Reducer for MpiReducer {
    fn sum(&self, local: f64) -> f64 {
        self.all_reduce(local, MPI_SUM)
    }

    fn min(&self, local: f64) -> f64 {
        self.all_reduce(local, MPI_MIN)
    }

    fn max(&self, local: f64) -> f64 {
        self.all_reduce(local, MPI_MAX)
    }

    fn get_rank(&self) -> usize {
        self.rank
    }

    fn get_size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_accepts_success() {
        check(MPI_SUCCESS, "MPI_Allreduce");
    }

    #[test]
    #[should_panic(expected = "MPI_Allreduce returned error code 13")]
    fn test_check_panics_on_error_code() {
        check(13, "MPI_Allreduce");
    }
}
