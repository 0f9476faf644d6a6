fn main() {
    embuild::espidf::sysenv::output();

    // Bake the build wall-clock in for the console's SETNOW command.
    let build_epoch = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    println!("cargo:rustc-env=FOCUSDOCK_BUILD_EPOCH={build_epoch}");
}
