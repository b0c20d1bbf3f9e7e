use build_script_cfg::Cfg;
use search_cuda_tools::{find_cuda_root, find_cufft};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // must agree with the cfg the cufft crate defines for itself
    let cufft = Cfg::new("detected_cufft");
    if find_cuda_root()
        .and_then(|toolkit| find_cufft(toolkit))
        .is_some()
    {
        cufft.define();
    }
}
