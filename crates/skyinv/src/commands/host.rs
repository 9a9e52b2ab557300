pub fn handle(name: &str) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&skyinv_core::host_vars(name))?);
    Ok(())
}
