use assert_cmd::Command;
use assert_fs::prelude::*;
use insta::assert_snapshot;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("splice-template").unwrap()
}

const CHART_TEMPLATE: &str = r#"{{- if .Values.installCRDs }}
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: capsules.rig.dev
spec:
  group: rig.dev
  versions:
  - name: v1alpha1
    served: true
{{- end }}
"#;

const CRD_BASE: &str = r#"---
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  annotations:
    controller-gen.kubebuilder.io/version: v0.14.0
  name: capsules.rig.dev
spec:
  group: rig.dev
  versions:
  - name: v1alpha2
    served: true
    storage: true
"#;

#[test]
fn splice_template_uses_default_paths_without_arguments() {
    let temp = assert_fs::TempDir::new().unwrap();
    let template = temp.child("deploy/charts/rig-operator/templates/crd.yaml");
    template.write_str(CHART_TEMPLATE).unwrap();
    let fragment = temp.child("deploy/kustomize/crd/bases/rig.dev_capsules.yaml");
    fragment.write_str(CRD_BASE).unwrap();

    cmd().current_dir(temp.path()).assert().success();

    let content = std::fs::read_to_string(template.path()).unwrap();
    assert_snapshot!(content, @r#"
    {{- if .Values.installCRDs }}
    apiVersion: apiextensions.k8s.io/v1
    kind: CustomResourceDefinition
    metadata:
      name: capsules.rig.dev
    spec:
      group: rig.dev
      versions:
      - name: v1alpha2
        served: true
        storage: true
    {{- end }}
    "#);
    fragment.assert(CRD_BASE);
}

#[test]
fn splice_template_fails_loudly_when_fragment_lacks_marker() {
    let temp = assert_fs::TempDir::new().unwrap();
    let template = temp.child("crd.yaml");
    template.write_str(CHART_TEMPLATE).unwrap();
    let fragment = temp.child("fragment.yaml");
    fragment.write_str("spec:\n  group: rig.dev\n").unwrap();

    cmd()
        .arg("--template")
        .arg(template.path())
        .arg("--fragment")
        .arg(fragment.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in the fragment document"));

    template.assert(CHART_TEMPLATE);
}

#[test]
fn splice_template_fails_when_template_lacks_marker() {
    let temp = assert_fs::TempDir::new().unwrap();
    let template = temp.child("crd.yaml");
    template.write_str("kind: ConfigMap\n").unwrap();
    let fragment = temp.child("fragment.yaml");
    fragment.write_str(CRD_BASE).unwrap();

    cmd()
        .arg("--template")
        .arg(template.path())
        .arg("--fragment")
        .arg(fragment.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in the template document"));

    template.assert("kind: ConfigMap\n");
}

#[test]
fn splice_template_fails_when_fragment_is_missing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let template = temp.child("crd.yaml");
    template.write_str(CHART_TEMPLATE).unwrap();

    cmd()
        .arg("--template")
        .arg(template.path())
        .arg("--fragment")
        .arg(temp.child("missing.yaml").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.yaml"));

    template.assert(CHART_TEMPLATE);
}

#[test]
fn splice_subcommand_with_custom_marker_and_output() {
    let temp = assert_fs::TempDir::new().unwrap();
    let template = temp.child("a.txt");
    template.write_str("A\nX:\nfoo\n").unwrap();
    let fragment = temp.child("b.txt");
    fragment.write_str("B\nX:\nbar\n").unwrap();
    let output = temp.child("out.txt");

    Command::cargo_bin("marker-splice")
        .unwrap()
        .arg("splice")
        .arg("--template")
        .arg(template.path())
        .arg("--fragment")
        .arg(fragment.path())
        .arg("--marker")
        .arg("X:\n")
        .arg("--trailer")
        .arg("END\n")
        .arg("--output")
        .arg(output.path())
        .assert()
        .success();

    output.assert("A\nX:\nbar\nEND\n");
    template.assert("A\nX:\nfoo\n");
}

#[test]
fn splice_dry_run_prints_without_writing() {
    let temp = assert_fs::TempDir::new().unwrap();
    let template = temp.child("a.txt");
    template.write_str("A\nX:\nfoo\n").unwrap();
    let fragment = temp.child("b.txt");
    fragment.write_str("B\nX:\nbar\n").unwrap();

    cmd()
        .arg("--template")
        .arg(template.path())
        .arg("--fragment")
        .arg(fragment.path())
        .args(["--marker", "X:\n", "--trailer", "END\n", "--dry-run"])
        .assert()
        .success()
        .stdout("A\nX:\nbar\nEND\n");

    template.assert("A\nX:\nfoo\n");
}
