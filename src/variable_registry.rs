use fnv::FnvHashMap;

use crate::instance::Variable;

#[derive(Clone, Debug, Default)]
pub(crate) struct VariableRegister {
    names: Vec<String>,
    by_name: FnvHashMap<String, Variable>,
    original_variables: Vec<Variable>,
}

impl VariableRegister {
    pub(crate) fn new() -> VariableRegister {
        VariableRegister::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }

    pub(crate) fn get(&self, var: Variable) -> Option<&str> {
        self.names.get(var.index()).map(|s| s.as_str())
    }

    pub(crate) fn get_by_name(&self, name: &str) -> Option<Variable> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn create_original(&mut self, name: &str) -> Variable {
        let var = Variable(self.names.len());
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), var);
        self.original_variables.push(var);
        var
    }

    pub(crate) fn create_auxiliary(&mut self) -> Variable {
        let var = Variable(self.names.len());
        self.names.push(format!("t#{}", var.index()));
        var
    }

    pub(crate) fn iter_original(&self) -> impl Iterator<Item = Variable> + '_ {
        self.original_variables.iter().copied()
    }
}
