//! Validates every generated WGSL module with naga, the same front-end wgpu
//! uses at runtime. Catches type and binding errors without a GPU.

use glowfield::shader;

fn validate_wgsl(code: &str) -> Result<(), String> {
    let module = naga::front::wgsl::parse_str(code)
        .map_err(|e| format!("WGSL parse error: {}", e.emit_to_string(code)))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| format!("WGSL validation error: {:?}", e))?;

    Ok(())
}

#[test]
fn simulation_module_is_valid() {
    validate_wgsl(&shader::sim_wgsl()).expect("simulation WGSL should be valid");
}

#[test]
fn render_module_with_simulation_is_valid() {
    validate_wgsl(&shader::render_wgsl(true)).expect("render WGSL (sim) should be valid");
}

#[test]
fn render_module_with_fallback_is_valid() {
    validate_wgsl(&shader::render_wgsl(false)).expect("render WGSL (fallback) should be valid");
}

#[test]
fn generation_is_deterministic() {
    assert_eq!(shader::sim_wgsl(), shader::sim_wgsl());
    assert_eq!(shader::render_wgsl(true), shader::render_wgsl(true));
}
